//! Data models for aggregated feed items and feed-level metadata.
//!
//! A [`FeedItem`] is the normalized representation of one article: created
//! by the article parser, tagged with its topic area by the aggregator, and
//! consumed read-only by the serializers. [`FeedMeta`] carries the per-feed
//! constants (title, home URL, self URL base, stable id) that never vary per
//! item.

use serde::{Deserialize, Serialize};
use url::Url;

/// Maximum description length in characters; longer text is truncated.
pub const DESCRIPTION_MAX: usize = 800;

/// One aggregated article, normalized for syndication.
///
/// Invariants held after construction: `title` and `description` are
/// non-empty plain text with no control characters; `link` and `guid` are
/// equal, absolute, and canonicalized; `description` is at most
/// [`DESCRIPTION_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeedItem {
    /// Article headline; falls back to the URL when the page has none.
    pub title: String,
    /// Canonical absolute article URL.
    pub link: String,
    /// Identity key for deduplication; equals `link`.
    pub guid: String,
    /// Plain-text summary, capped at [`DESCRIPTION_MAX`] characters.
    pub description: String,
    /// Publish timestamp in RFC-2822 form, when the source provides one.
    pub pub_date: Option<String>,
    /// Absolute URL of a representative image, when found.
    pub image: Option<String>,
    /// Absolute URL of an attached video, when found.
    pub video: Option<String>,
    /// Topic-area slug the item was collected under.
    pub category: Option<String>,
}

/// Feed-level metadata, derived deterministically from a topic slug and the
/// configured site base. Shared by the RSS, Atom, and JSON serializers.
#[derive(Debug, Clone)]
pub struct FeedMeta {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub home_url: String,
    /// Base URL the generated feed files are served from, with a trailing slash.
    pub site_base: String,
    /// Stable Atom id, `urn:<ns>:<slug>`.
    pub id: String,
}

impl FeedMeta {
    /// Build metadata for a topic slug.
    ///
    /// The urn namespace is the first host label of `site_base`, so feeds
    /// published from `https://example-feeds.github.io/...` get ids like
    /// `urn:example-feeds:robotics`.
    pub fn for_slug(slug: &str, display: &str, site_base: &str, home_url: &str) -> Self {
        let mut base = site_base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let ns = Url::parse(&base)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .and_then(|h| h.split('.').next().map(|l| l.to_string()))
            .unwrap_or_else(|| "feeds".to_string());
        FeedMeta {
            slug: slug.to_string(),
            title: format!("{display} — Aggregated Feed"),
            description: format!("Aggregated news feed for {display}. Generated for convenience."),
            home_url: home_url.to_string(),
            site_base: base,
            id: format!("urn:{ns}:{slug}"),
        }
    }

    pub fn rss_url(&self) -> String {
        format!("{}feeds/{}.xml", self.site_base, self.slug)
    }

    pub fn atom_url(&self) -> String {
        format!("{}feeds/{}.atom.xml", self.site_base, self.slug)
    }

    pub fn json_url(&self) -> String {
        format!("{}feeds/{}.json", self.site_base, self.slug)
    }
}
