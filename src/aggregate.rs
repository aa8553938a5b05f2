//! Per-area aggregation: run every configured source through link
//! extraction and article parsing, then merge, deduplicate, sort, and cap.
//!
//! Failure containment lives here: a dead source contributes zero links, a
//! bad article is dropped, and processing always continues with whatever
//! remains. Derived feeds ("all", "videos", "tech-leaders") reuse the same
//! dedup/sort/cap treatment over already-collected items instead of
//! fetching anything new.

use crate::article;
use crate::config::SourceConfig;
use crate::http::Fetch;
use crate::links;
use crate::models::FeedItem;
use chrono::DateTime;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{info, instrument, warn};

/// Topic slugs included in the "tech-leaders" spotlight feed.
pub const TECH_LEADER_AREAS: &[&str] = &[
    "elon-musk",
    "sam-altman",
    "jensen-huang",
    "demis-hassabis",
    "mark-zuckerberg",
    "sundar-pichai",
    "satya-nadella",
    "tim-cook",
];

/// Collect, normalize, and rank the items for one topic area.
///
/// Sources run one at a time, articles one at a time within each source.
/// An index fetch failure is logged and the source skipped; the area keeps
/// going with the remaining sources.
#[instrument(level = "info", skip(fetcher, sources), fields(%area))]
pub async fn collect_area<F: Fetch>(
    fetcher: &F,
    area: &str,
    sources: &[SourceConfig],
    max_items: usize,
) -> Vec<FeedItem> {
    let mut collected: Vec<FeedItem> = Vec::new();

    for source in sources {
        let body = match fetcher.fetch(&source.index).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    source = source.display_name(),
                    error = %e,
                    "Index fetch failed; source contributes no links"
                );
                continue;
            }
        };

        let candidates = links::pick_links(&body, source);
        info!(
            source = source.display_name(),
            count = candidates.len(),
            "Indexed candidate article links"
        );

        let items: Vec<FeedItem> = stream::iter(candidates)
            .then(|url| async move { article::parse_article(fetcher, &url).await })
            .filter_map(std::future::ready)
            .collect()
            .await;

        for mut item in items {
            item.category = Some(area.to_string());
            collected.push(item);
        }
    }

    let ranked = dedup_sort_cap(collected, max_items);
    info!(count = ranked.len(), "Area aggregation complete");
    ranked
}

/// Deduplicate by guid (first occurrence wins), sort newest-first with
/// undated items sinking to the bottom, and truncate to `max` items.
pub fn dedup_sort_cap(items: Vec<FeedItem>, max: usize) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = items
        .into_iter()
        .unique_by(|item| item.guid.clone())
        .collect();
    // Stable sort: undated items keep their relative input order at the end.
    items.sort_by_key(|item| std::cmp::Reverse(sort_timestamp(item)));
    items.truncate(max);
    items
}

/// Sort key: unix timestamp of the publish date, or the minimum possible
/// value so undated items never outrank dated ones.
fn sort_timestamp(item: &FeedItem) -> i64 {
    item.pub_date
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
        .map(|dt| dt.timestamp())
        .unwrap_or(i64::MIN)
}

/// The "all" feed: the union of every area's ranked list, re-deduplicated,
/// re-sorted, re-capped.
pub fn derive_all(pool: &[FeedItem], max_items: usize) -> Vec<FeedItem> {
    dedup_sort_cap(pool.to_vec(), max_items)
}

/// The "videos" feed: items carrying a video attachment.
pub fn derive_videos(pool: &[FeedItem], max_items: usize) -> Vec<FeedItem> {
    let subset: Vec<FeedItem> = pool.iter().filter(|i| i.video.is_some()).cloned().collect();
    dedup_sort_cap(subset, max_items)
}

/// The "tech-leaders" feed: items collected under a spotlighted topic slug.
pub fn derive_tech_leaders(pool: &[FeedItem], max_items: usize) -> Vec<FeedItem> {
    let subset: Vec<FeedItem> = pool
        .iter()
        .filter(|i| {
            i.category
                .as_deref()
                .is_some_and(|c| TECH_LEADER_AREAS.contains(&c))
        })
        .cloned()
        .collect();
    dedup_sort_cap(subset, max_items)
}
