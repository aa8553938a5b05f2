//! Static homepage generation.
//!
//! Unlike the feed files, the homepage is regenerated unconditionally on
//! every run: it enumerates whatever feed files exist on disk after the
//! run, including areas left untouched because they were quiet this time.

use crate::utils::xml_text;
use std::fmt::Write;

/// One feed listed on the homepage.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedListing {
    pub slug: String,
    pub title: String,
}

/// Render the homepage HTML listing RSS/Atom/JSON links for each feed.
pub fn render(home_url: &str, listings: &[FeedListing]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\">\n");
    out.push_str("  <title>Aggregated News Feeds</title>\n");
    out.push_str("</head>\n<body>\n");
    out.push_str("  <h1>Aggregated News Feeds</h1>\n");
    writeln!(
        out,
        "  <p>Machine-generated topic feeds for <a href=\"{}\">the main site</a>.</p>",
        xml_text(home_url)
    )
    .unwrap();
    out.push_str("  <ul>\n");
    for listing in listings {
        writeln!(
            out,
            "    <li>{title} — <a href=\"feeds/{slug}.xml\">RSS</a> · <a href=\"feeds/{slug}.atom.xml\">Atom</a> · <a href=\"feeds/{slug}.json\">JSON</a></li>",
            title = xml_text(&listing.title),
            slug = xml_text(&listing.slug),
        )
        .unwrap();
    }
    out.push_str("  </ul>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homepage_lists_every_feed() {
        let listings = vec![
            FeedListing {
                slug: "robotics".to_string(),
                title: "Robotics".to_string(),
            },
            FeedListing {
                slug: "all".to_string(),
                title: "All".to_string(),
            },
        ];
        let html = render("https://acme.example/", &listings);
        assert!(html.contains("feeds/robotics.xml"));
        assert!(html.contains("feeds/robotics.atom.xml"));
        assert!(html.contains("feeds/robotics.json"));
        assert!(html.contains("feeds/all.xml"));
        assert!(html.contains("https://acme.example/"));
    }

    #[test]
    fn test_homepage_escapes_titles() {
        let listings = vec![FeedListing {
            slug: "rnd".to_string(),
            title: "R&D <beta>".to_string(),
        }];
        let html = render("https://acme.example/", &listings);
        assert!(html.contains("R&amp;D &lt;beta&gt;"));
    }

    #[test]
    fn test_homepage_with_no_feeds_is_still_a_page() {
        let html = render("https://acme.example/", &[]);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<ul>"));
    }
}
