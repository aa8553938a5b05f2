//! Text sanitation, MIME guessing, and file system helpers.
//!
//! Everything that ends up inside a feed document passes through
//! [`clean_text`] (and, for XML, [`xml_text`]) so that serialized output
//! never carries control characters, byte-order marks, or unescaped markup.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// XML 1.0 disallows these control characters even when escaped.
static CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip byte-order marks and control characters from a text field.
///
/// Applied to every textual field of an item before it is stored, so the
/// serializers can assume their input is already free of characters that
/// would make the output unparseable.
pub fn clean_text(s: &str) -> String {
    let s = s.replace('\u{feff}', "");
    CONTROL.replace_all(&s, "").into_owned()
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_ws(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Escape a string for use as XML text or attribute content.
///
/// Combines [`clean_text`] with entity escaping; safe for `<title>`,
/// `<link>`, `<description>` and attribute values without CDATA.
pub fn xml_text(s: &str) -> String {
    let cleaned = clean_text(s);
    quick_xml::escape::escape(cleaned.as_str()).into_owned()
}

/// Truncate to at most `max` characters, on a character boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Extension to MIME type table for enclosure/attachment media.
const MIME_TABLE: &[(&str, &str)] = &[
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".webp", "image/webp"),
    (".mp4", "video/mp4"),
    (".webm", "video/webm"),
    (".mov", "video/quicktime"),
    (".m4v", "video/x-m4v"),
    (".avi", "video/x-msvideo"),
    (".mkv", "video/x-matroska"),
];

/// Guess a MIME type from a URL's file extension.
///
/// Returns `default` when no known extension appears anywhere in the URL
/// (query-string suffixes like `?fmt=.jpg` count, matching the loose check
/// feed readers themselves use).
pub fn guess_mime(url: &str, default: &str) -> String {
    let lower = url.to_lowercase();
    for (ext, mime) in MIME_TABLE {
        if lower.contains(ext) {
            return (*mime).to_string();
        }
    }
    default.to_string()
}

/// Turn an area slug into a human-readable title: `ai-robotics` -> `Ai Robotics`.
pub fn title_case(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if missing, then probes it with a throwaway file.
/// Run this before any network work so a bad `--out-dir` fails fast.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_bom_and_controls() {
        assert_eq!(clean_text("\u{feff}hello\x00\x08 world"), "hello world");
        assert_eq!(clean_text("tab\tand\nnewline stay"), "tab\tand\nnewline stay");
    }

    #[test]
    fn test_xml_text_escapes_markup() {
        assert_eq!(xml_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(xml_text("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_collapse_ws() {
        assert_eq!(collapse_ws("  a \n\t b   c  "), "a b c");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }

    #[test]
    fn test_guess_mime_known_extensions() {
        assert_eq!(guess_mime("https://x.com/a.JPG", "image/jpeg"), "image/jpeg");
        assert_eq!(guess_mime("https://x.com/a.webm", "video/mp4"), "video/webm");
        assert_eq!(
            guess_mime("https://x.com/clip.mov?h=1", "video/mp4"),
            "video/quicktime"
        );
    }

    #[test]
    fn test_guess_mime_unknown_falls_back() {
        assert_eq!(guess_mime("https://x.com/video", "video/mp4"), "video/mp4");
        assert_eq!(guess_mime("https://x.com/img", "image/jpeg"), "image/jpeg");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ai-robotics"), "Ai Robotics");
        assert_eq!(title_case("tech-leaders"), "Tech Leaders");
        assert_eq!(title_case("all"), "All");
    }
}
