//! Article page parsing into normalized [`FeedItem`] records.
//!
//! Every field follows a first-match-wins chain over the usual metadata
//! sources: Open Graph tags first, then document structure, then a
//! guaranteed fallback so required fields are never empty. Any fetch
//! failure makes the whole article come back as `None`; one bad page never
//! aborts a run.

use crate::http::Fetch;
use crate::models::{DESCRIPTION_MAX, FeedItem};
use crate::urls;
use crate::utils::{clean_text, collapse_ws, truncate_chars};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{instrument, warn};

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static OG_DESC: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static ARTICLE_P: Lazy<Selector> = Lazy::new(|| Selector::parse("article p").unwrap());
static P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());
static TW_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="twitter:image"]"#).unwrap());
static IMAGE_SRC: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="image_src"]"#).unwrap());
static OG_VIDEO_SECURE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:video:secure_url"]"#).unwrap());
static OG_VIDEO_URL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:video:url"]"#).unwrap());
static OG_VIDEO: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:video"]"#).unwrap());
static VIDEO: Lazy<Selector> = Lazy::new(|| Selector::parse("video[src]").unwrap());
static VIDEO_SOURCE: Lazy<Selector> = Lazy::new(|| Selector::parse("video source[src]").unwrap());
static IFRAME: Lazy<Selector> = Lazy::new(|| Selector::parse("iframe[src]").unwrap());
static PUBLISHED_TIME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="article:published_time"]"#).unwrap());
static PUBDATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="pubdate"]"#).unwrap());

/// Hosts whose embedded iframes count as video attachments.
const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be", "vimeo.com"];

/// Fetch and parse one article. `None` on any failure; the caller logs the
/// skip and moves on.
#[instrument(level = "debug", skip(fetcher))]
pub async fn parse_article<F: Fetch>(fetcher: &F, url: &str) -> Option<FeedItem> {
    match fetcher.fetch(url).await {
        Ok(body) => Some(item_from_html(&body, url)),
        Err(e) => {
            warn!(%url, error = %e, "Article fetch failed; skipping");
            None
        }
    }
}

/// Build an item from already-fetched article HTML. Pure and infallible:
/// the fallback chains guarantee a usable title and description even for an
/// empty document.
pub fn item_from_html(body: &str, url: &str) -> FeedItem {
    let doc = Html::parse_document(body);
    let canon = urls::canon_url(url);

    let title = meta_content(&doc, &OG_TITLE)
        .or_else(|| element_text(&doc, &TITLE))
        .map(|t| clean_text(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| canon.clone());

    let description = meta_content(&doc, &OG_DESC)
        .or_else(|| first_paragraph(&doc))
        .map(|d| clean_text(&d))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| title.clone());
    let description = truncate_chars(&description, DESCRIPTION_MAX);

    let image = meta_content(&doc, &OG_IMAGE)
        .or_else(|| meta_content(&doc, &TW_IMAGE))
        .or_else(|| attr_of(&doc, &IMAGE_SRC, "href"))
        .and_then(|raw| urls::abs_url(url, Some(&raw)));

    let video = extract_video(&doc, url);
    let pub_date = publish_date(&doc);

    FeedItem {
        title,
        link: canon.clone(),
        guid: canon,
        description,
        pub_date,
        image,
        video,
        category: None,
    }
}

fn meta_content(doc: &Html, sel: &Selector) -> Option<String> {
    attr_of(doc, sel, "content")
}

fn attr_of(doc: &Html, sel: &Selector, attr: &str) -> Option<String> {
    doc.select(sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn element_text(doc: &Html, sel: &Selector) -> Option<String> {
    let el = doc.select(sel).next()?;
    let text = collapse_ws(&el.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

/// First paragraph inside `<article>`, or anywhere in the document when the
/// page has no article element.
fn first_paragraph(doc: &Html) -> Option<String> {
    let p = if doc.select(&ARTICLE).next().is_some() {
        doc.select(&ARTICLE_P).next()
    } else {
        doc.select(&P).next()
    }?;
    let text = collapse_ws(&p.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

fn extract_video(doc: &Html, base: &str) -> Option<String> {
    meta_content(doc, &OG_VIDEO_SECURE)
        .or_else(|| meta_content(doc, &OG_VIDEO_URL))
        .or_else(|| meta_content(doc, &OG_VIDEO))
        .or_else(|| attr_of(doc, &VIDEO, "src"))
        .or_else(|| attr_of(doc, &VIDEO_SOURCE, "src"))
        .and_then(|raw| urls::abs_url(base, Some(&raw)))
        .or_else(|| iframe_video(doc, base))
}

/// An `<iframe>` counts only when it points at a known video host.
fn iframe_video(doc: &Html, base: &str) -> Option<String> {
    for frame in doc.select(&IFRAME) {
        let Some(abs) = urls::abs_url(base, frame.value().attr("src")) else {
            continue;
        };
        let Some(host) = urls::host_of(&abs) else {
            continue;
        };
        if VIDEO_HOSTS
            .iter()
            .any(|v| host == *v || host.ends_with(&format!(".{v}")))
        {
            return Some(abs);
        }
    }
    None
}

fn publish_date(doc: &Html) -> Option<String> {
    let raw = meta_content(doc, &PUBLISHED_TIME).or_else(|| meta_content(doc, &PUBDATE))?;
    iso_to_rfc2822(&raw)
}

/// Parse an ISO-8601 timestamp (a literal `Z` suffix is a UTC offset) and
/// reformat it as RFC-2822. Unparseable input yields `None`, never a
/// default date.
pub fn iso_to_rfc2822(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.to_rfc2822());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().to_rfc2822());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().to_rfc2822());
    }
    None
}
