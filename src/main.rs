//! Binary entry point: load configuration, aggregate every topic area,
//! write the derived feeds, regenerate the homepage.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use topic_feeds::aggregate;
use topic_feeds::cli::Cli;
use topic_feeds::config::Config;
use topic_feeds::http::{HttpFetcher, RetryFetch, build_client};
use topic_feeds::models::{FeedItem, FeedMeta};
use topic_feeds::outputs::{self, homepage};
use topic_feeds::utils::{ensure_writable_dir, title_case};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("topic_feeds starting up");

    let args = Cli::parse();
    let config = Config::load(&args.config)?;
    info!(path = %args.config, areas = config.areas.len(), "Loaded configuration");

    // Early check: a bad output directory should fail before any fetching.
    let feeds_dir_string = format!("{}/feeds", args.out_dir.trim_end_matches('/'));
    ensure_writable_dir(&feeds_dir_string).await?;
    let feeds_dir = Path::new(&feeds_dir_string);

    let fetcher = RetryFetch::new(HttpFetcher::new(build_client()?), 2, Duration::from_secs(1));

    // ---- Aggregate each topic area ----
    let mut pool: Vec<FeedItem> = Vec::new();
    for (slug, sources) in &config.areas {
        let items =
            aggregate::collect_area(&fetcher, slug, sources, config.max_items_per_area).await;
        if items.is_empty() {
            info!(area = %slug, "No items collected; leaving previous files untouched");
            continue;
        }
        let meta = FeedMeta::for_slug(slug, &title_case(slug), &config.site_base, &config.home_url);
        outputs::write_feed_set(feeds_dir, &meta, &items).await?;
        info!(area = %slug, count = items.len(), "Wrote area feeds");
        pool.extend(items);
    }

    // ---- Derived feeds over the collected pool ----
    let derived = [
        (
            "all",
            "All Topics",
            aggregate::derive_all(&pool, config.max_items_per_area),
        ),
        (
            "videos",
            "Videos",
            aggregate::derive_videos(&pool, config.max_items_per_area),
        ),
        (
            "tech-leaders",
            "Tech Leaders",
            aggregate::derive_tech_leaders(&pool, config.max_items_per_area),
        ),
    ];
    for (slug, display, items) in &derived {
        if items.is_empty() {
            info!(feed = %slug, "Derived feed is empty; skipping");
            continue;
        }
        let meta = FeedMeta::for_slug(slug, display, &config.site_base, &config.home_url);
        outputs::write_feed_set(feeds_dir, &meta, items).await?;
        info!(feed = %slug, count = items.len(), "Wrote derived feed");
    }

    // ---- Homepage: list every feed present on disk after this run ----
    let mut listings = Vec::new();
    for slug in config.areas.keys() {
        if feeds_dir.join(format!("{slug}.xml")).exists() {
            listings.push(homepage::FeedListing {
                slug: slug.clone(),
                title: title_case(slug),
            });
        }
    }
    for (slug, display, _) in &derived {
        if feeds_dir.join(format!("{slug}.xml")).exists() {
            listings.push(homepage::FeedListing {
                slug: (*slug).to_string(),
                title: (*display).to_string(),
            });
        }
    }
    let html = homepage::render(&config.home_url, &listings);
    let index_path = format!("{}/index.html", args.out_dir.trim_end_matches('/'));
    tokio::fs::write(&index_path, html).await?;
    info!(path = %index_path, feeds = listings.len(), "Regenerated homepage");

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}
