//! RSS 2.0 serialization.

use crate::models::{FeedItem, FeedMeta};
use crate::utils::{guess_mime, xml_text};
use chrono::Utc;
use std::fmt::Write;

/// Render a complete RSS 2.0 document. All text content is escaped; an
/// empty item list still yields a valid channel.
pub fn render(meta: &FeedMeta, items: &[FeedItem]) -> String {
    let now_rfc = Utc::now().to_rfc2822();
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<rss version=\"2.0\">\n");
    out.push_str("  <channel>\n");
    writeln!(out, "    <title>{}</title>", xml_text(&meta.title)).unwrap();
    writeln!(out, "    <link>{}</link>", xml_text(&meta.home_url)).unwrap();
    writeln!(
        out,
        "    <description>{}</description>",
        xml_text(&meta.description)
    )
    .unwrap();
    out.push_str("    <language>en-us</language>\n");
    writeln!(out, "    <lastBuildDate>{now_rfc}</lastBuildDate>").unwrap();

    for item in items {
        out.push_str("    <item>\n");
        writeln!(out, "      <title>{}</title>", xml_text(&item.title)).unwrap();
        writeln!(out, "      <link>{}</link>", xml_text(&item.link)).unwrap();
        writeln!(
            out,
            "      <guid isPermaLink=\"true\">{}</guid>",
            xml_text(&item.guid)
        )
        .unwrap();
        writeln!(
            out,
            "      <description>{}</description>",
            xml_text(&item.description)
        )
        .unwrap();
        if let Some(date) = &item.pub_date {
            writeln!(out, "      <pubDate>{}</pubDate>", xml_text(date)).unwrap();
        }
        if let Some(image) = &item.image {
            writeln!(
                out,
                "      <enclosure url=\"{}\" length=\"0\" type=\"{}\"/>",
                xml_text(image),
                guess_mime(image, "image/jpeg")
            )
            .unwrap();
        }
        if let Some(video) = &item.video {
            writeln!(
                out,
                "      <enclosure url=\"{}\" length=\"0\" type=\"{}\"/>",
                xml_text(video),
                guess_mime(video, "video/mp4")
            )
            .unwrap();
        }
        if let Some(category) = &item.category {
            writeln!(out, "      <category>{}</category>", xml_text(category)).unwrap();
        }
        out.push_str("    </item>\n");
    }

    out.push_str("  </channel>\n");
    out.push_str("</rss>\n");
    out
}
