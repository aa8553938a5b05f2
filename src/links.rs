//! Candidate article link extraction from source index documents.
//!
//! A source's index is either an HTML page or an upstream RSS/Atom feed.
//! HTML indexes go through an ordered chain of selection rules — preferred
//! prefix, per-domain path patterns, generic news-path fallback — where the
//! first rule that yields anything wins. Feed indexes are read directly for
//! their entry links. Either way the result is an ordered, de-duplicated,
//! length-limited list of canonical same-host article URLs.

use crate::config::{IngestMode, SourceConfig};
use crate::urls;
use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::error::Error;
use tracing::{debug, warn};

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Per-domain path prefixes for index pages where the generic heuristics
/// pick up too much chrome. Matched against the source host by suffix, so
/// `news.berkeley.edu` hits the `berkeley.edu` row.
const DOMAIN_PATTERNS: &[(&str, &[&str])] = &[
    ("nanowerk.com", &["/news2/"]),
    ("phys.org", &["/news/"]),
    ("sciencedaily.com", &["/releases/"]),
    ("news.mit.edu", &["/20"]),
    ("berkeley.edu", &["/20"]),
];

/// Last-resort href substrings that usually mark an article path.
const GENERIC_HINTS: &[&str] = &["/news/", "/story/", "/releases/", "/202", "/20", "/blog/"];

/// Index URLs ending in one of these are treated as feeds without sniffing.
const FEED_SUFFIXES: &[&str] = &[".rss", ".atom", ".xml", "/feed", "/feed/", "/rss", "/rss/"];

/// Decide how to ingest a source's index document.
///
/// Order: explicit config flag, feed-like URL suffix, then a content sniff
/// of the first ~200 characters for an `<rss` or `<feed` tag.
pub fn detect_mode(source: &SourceConfig, body: &str) -> IngestMode {
    if let Some(mode) = source.mode {
        return mode;
    }
    let path = source.index.split(['?', '#']).next().unwrap_or("").to_lowercase();
    if FEED_SUFFIXES.iter().any(|s| path.ends_with(s)) {
        return IngestMode::Feed;
    }
    let head: String = body.chars().take(200).collect();
    if head.contains("<rss") || head.contains("<feed") {
        IngestMode::Feed
    } else {
        IngestMode::Html
    }
}

/// Extract candidate article links from a fetched index document.
pub fn pick_links(body: &str, source: &SourceConfig) -> Vec<String> {
    let links = match detect_mode(source, body) {
        IngestMode::Html => links_from_html(body, source),
        IngestMode::Feed => links_from_feed(body, source),
    };
    debug!(
        source = source.display_name(),
        count = links.len(),
        "Extracted candidate links"
    );
    links
}

fn links_from_html(body: &str, source: &SourceConfig) -> Vec<String> {
    let Some(host) = urls::host_of(&source.base) else {
        warn!(base = %source.base, "Source base URL has no host; skipping");
        return Vec::new();
    };

    let doc = Html::parse_document(body);
    let hrefs: Vec<String> = doc
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href").map(|h| h.to_string()))
        .collect();

    // Ordered rule chain; the first rule that matches anything wins.
    let mut rules: Vec<Box<dyn Fn(&str) -> bool>> = Vec::new();
    if let Some(prefix) = source.prefix.clone() {
        rules.push(Box::new(move |href: &str| href.starts_with(prefix.as_str())));
    }
    let patterns = domain_patterns(&host);
    if !patterns.is_empty() {
        rules.push(Box::new(move |href: &str| {
            patterns.iter().any(|p| href.starts_with(p))
        }));
    }
    rules.push(Box::new(|href: &str| {
        GENERIC_HINTS.iter().any(|k| href.contains(k))
    }));

    for rule in rules {
        let picked = collect_matching(&hrefs, source, &host, rule.as_ref());
        if !picked.is_empty() {
            return picked;
        }
    }
    Vec::new()
}

fn domain_patterns(host: &str) -> Vec<&'static str> {
    DOMAIN_PATTERNS
        .iter()
        .filter(|(domain, _)| host == *domain || host.ends_with(&format!(".{domain}")))
        .flat_map(|(_, patterns)| patterns.iter().copied())
        .collect()
}

/// Scan anchors in document order, keeping same-host matches up to the
/// per-source limit. Duplicates by canonical URL are skipped.
fn collect_matching(
    hrefs: &[String],
    source: &SourceConfig,
    host: &str,
    matches: &dyn Fn(&str) -> bool,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for href in hrefs {
        if out.len() >= source.limit {
            break;
        }
        if !matches(href) {
            continue;
        }
        let Some(full) = urls::abs_url(&source.base, Some(href)) else {
            continue;
        };
        if urls::host_of(&full).as_deref() != Some(host) {
            continue;
        }
        if seen.insert(full.clone()) {
            out.push(full);
        }
    }
    out
}

fn links_from_feed(body: &str, source: &SourceConfig) -> Vec<String> {
    let raw = match feed_link_candidates(body) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(source = source.display_name(), error = %e, "Unparseable feed document");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for href in raw {
        if out.len() >= source.limit {
            break;
        }
        let Some(full) = urls::abs_url(&source.base, Some(&href)) else {
            continue;
        };
        if seen.insert(full.clone()) {
            out.push(full);
        }
    }
    out
}

/// Pull entry links out of an RSS 2.0 or Atom document, in document order.
///
/// RSS: the text of `item > link`. Atom: per entry, a `rel="alternate"`
/// link of HTML type is preferred, else the first `link`.
fn feed_link_candidates(body: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut in_item = false;
    let mut in_item_link = false;
    let mut in_entry = false;
    // (rel, type, href) per <link> of the current Atom entry
    let mut entry_links: Vec<(Option<String>, Option<String>, String)> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"item" => in_item = true,
                b"entry" => {
                    in_entry = true;
                    entry_links.clear();
                }
                b"link" if in_item => in_item_link = true,
                b"link" if in_entry => {
                    if let Some(link) = atom_link(&e)? {
                        entry_links.push(link);
                    }
                }
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"link" && in_entry {
                    if let Some(link) = atom_link(&e)? {
                        entry_links.push(link);
                    }
                }
            }
            Event::Text(t) => {
                if in_item_link {
                    out.push(t.xml_content()?.into_owned());
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"item" => {
                    in_item = false;
                    in_item_link = false;
                }
                b"link" => in_item_link = false,
                b"entry" => {
                    if let Some(href) = pick_entry_link(&entry_links) {
                        out.push(href);
                    }
                    in_entry = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn atom_link(
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<Option<(Option<String>, Option<String>, String)>, Box<dyn Error>> {
    let mut rel = None;
    let mut media_type = None;
    let mut href = None;
    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.local_name().as_ref() {
            b"rel" => rel = Some(value),
            b"type" => media_type = Some(value),
            b"href" => href = Some(value),
            _ => {}
        }
    }
    Ok(href.map(|h| (rel, media_type, h)))
}

fn pick_entry_link(links: &[(Option<String>, Option<String>, String)]) -> Option<String> {
    links
        .iter()
        .find(|(rel, ty, _)| {
            rel.as_deref() == Some("alternate")
                && ty.as_deref().is_some_and(|t| t.contains("html"))
        })
        .or_else(|| links.first())
        .map(|(_, _, href)| href.clone())
}
