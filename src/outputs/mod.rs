//! Output generation: feed serializers, XML validation, and file writing.
//!
//! # Submodules
//!
//! - [`rss`]: RSS 2.0 documents
//! - [`atom`]: Atom documents
//! - [`json`]: JSON Feed v1 documents
//! - [`homepage`]: the regenerated `index.html`
//!
//! # Output Structure
//!
//! ```text
//! out_dir/
//! ├── index.html
//! └── feeds/
//!     ├── robotics.xml
//!     ├── robotics.atom.xml
//!     ├── robotics.json
//!     └── ...
//! ```
//!
//! Generated XML is validated by parsing it back before anything touches
//! disk; a validation failure means a serializer bug and aborts the run
//! rather than committing malformed output.

pub mod atom;
pub mod homepage;
pub mod json;
pub mod rss;

use crate::models::{FeedItem, FeedMeta};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Check that a generated document is well-formed XML.
pub fn validate_xml(doc: &str) -> Result<(), Box<dyn Error>> {
    let mut reader = Reader::from_str(doc);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(e) => return Err(Box::new(e)),
        }
    }
}

/// All output files are UTF-8 with `\n` newlines.
fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Serialize one feed to its three files under `feeds_dir`.
///
/// The RSS and Atom documents are re-parsed before writing; failure there
/// is fatal by design, so a serializer defect can never silently commit
/// malformed output.
#[instrument(level = "info", skip_all, fields(slug = %meta.slug, count = items.len()))]
pub async fn write_feed_set(
    feeds_dir: &Path,
    meta: &FeedMeta,
    items: &[FeedItem],
) -> Result<(), Box<dyn Error>> {
    let rss_doc = rss::render(meta, items);
    if let Err(e) = validate_xml(&rss_doc) {
        return Err(format!("generated RSS for '{}' is not well-formed: {e}", meta.slug).into());
    }
    let atom_doc = atom::render(meta, items);
    if let Err(e) = validate_xml(&atom_doc) {
        return Err(format!("generated Atom for '{}' is not well-formed: {e}", meta.slug).into());
    }
    let json_doc = json::render(meta, items)?;

    fs::create_dir_all(feeds_dir).await?;
    fs::write(
        feeds_dir.join(format!("{}.xml", meta.slug)),
        normalize_newlines(&rss_doc),
    )
    .await?;
    fs::write(
        feeds_dir.join(format!("{}.atom.xml", meta.slug)),
        normalize_newlines(&atom_doc),
    )
    .await?;
    fs::write(
        feeds_dir.join(format!("{}.json", meta.slug)),
        normalize_newlines(&json_doc),
    )
    .await?;

    info!("Wrote feed files");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> FeedMeta {
        FeedMeta::for_slug(
            "robotics",
            "Robotics",
            "https://acme-feeds.github.io/acme-feeds/",
            "https://acme.example/",
        )
    }

    fn item() -> FeedItem {
        FeedItem {
            title: "Title".to_string(),
            link: "https://example.com/news/a".to_string(),
            guid: "https://example.com/news/a".to_string(),
            description: "Text".to_string(),
            pub_date: Some("Tue, 06 May 2025 10:00:00 +0000".to_string()),
            image: None,
            video: None,
            category: Some("robotics".to_string()),
        }
    }

    #[test]
    fn test_validate_xml_accepts_well_formed() {
        validate_xml("<?xml version=\"1.0\"?><a><b>x</b></a>").unwrap();
    }

    #[test]
    fn test_validate_xml_rejects_malformed() {
        assert!(validate_xml("<a><b></a>").is_err());
        assert!(validate_xml("<a>unclosed").is_err());
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[tokio::test]
    async fn test_write_feed_set_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let feeds_dir = dir.path().join("feeds");
        write_feed_set(&feeds_dir, &meta(), &[item()]).await.unwrap();

        let rss = std::fs::read_to_string(feeds_dir.join("robotics.xml")).unwrap();
        let atom = std::fs::read_to_string(feeds_dir.join("robotics.atom.xml")).unwrap();
        let json = std::fs::read_to_string(feeds_dir.join("robotics.json")).unwrap();

        validate_xml(&rss).unwrap();
        validate_xml(&atom).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["items"].as_array().unwrap().len(), 1);
        assert!(!rss.contains('\r'));
    }

    #[tokio::test]
    async fn test_write_feed_set_empty_list_seeds_valid_feeds() {
        let dir = tempfile::tempdir().unwrap();
        let feeds_dir = dir.path().join("feeds");
        write_feed_set(&feeds_dir, &meta(), &[]).await.unwrap();
        let rss = std::fs::read_to_string(feeds_dir.join("robotics.xml")).unwrap();
        validate_xml(&rss).unwrap();
    }
}
