//! Atom serialization.

use crate::models::{FeedItem, FeedMeta};
use crate::utils::xml_text;
use chrono::Utc;
use std::fmt::Write;

/// Render a complete Atom document with a `rel="self"` link and a stable
/// feed id. An empty item list still yields a valid feed.
pub fn render(meta: &FeedMeta, items: &[FeedItem]) -> String {
    let now_rfc = Utc::now().to_rfc2822();
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    writeln!(out, "  <title>{}</title>", xml_text(&meta.title)).unwrap();
    writeln!(out, "  <link href=\"{}\"/>", xml_text(&meta.home_url)).unwrap();
    writeln!(
        out,
        "  <link rel=\"self\" href=\"{}\"/>",
        xml_text(&meta.atom_url())
    )
    .unwrap();
    writeln!(out, "  <id>{}</id>", xml_text(&meta.id)).unwrap();
    writeln!(out, "  <updated>{now_rfc}</updated>").unwrap();

    for item in items {
        out.push_str("  <entry>\n");
        writeln!(out, "    <title>{}</title>", xml_text(&item.title)).unwrap();
        writeln!(out, "    <link href=\"{}\"/>", xml_text(&item.link)).unwrap();
        writeln!(out, "    <id>{}</id>", xml_text(&item.guid)).unwrap();
        writeln!(
            out,
            "    <summary>{}</summary>",
            xml_text(&item.description)
        )
        .unwrap();
        if let Some(date) = &item.pub_date {
            writeln!(out, "    <updated>{}</updated>", xml_text(date)).unwrap();
        }
        out.push_str("  </entry>\n");
    }

    out.push_str("</feed>\n");
    out
}
