//! URL canonicalization.
//!
//! The canonical form of a URL — absolute, fragment-free, with tracking
//! query parameters removed — is the deduplication key for the whole
//! pipeline. Two links that differ only by an `utm_*` parameter or a
//! fragment must compare equal after [`canon_url`].

use url::Url;

/// Tracking query parameters stripped during canonicalization, compared
/// case-insensitively by name. The `utm_` prefix family is matched as a
/// prefix so new `utm_whatever` variants need no code change.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "mc_cid", "mc_eid", "igshid", "si", "ref", "ref_src",
];

fn is_tracking_param(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("utm_") || TRACKING_PARAMS.contains(&lower.as_str())
}

/// Canonicalize a URL: absolute, no fragment, tracking params removed.
///
/// Input that does not parse as an absolute URL (no scheme, garbage) is
/// returned unchanged; this function never fails. Order and values of the
/// surviving query parameters are preserved, including blank values.
pub fn canon_url(u: &str) -> String {
    let Ok(mut parsed) = Url::parse(u) else {
        return u.to_string();
    };

    if parsed.query().is_some() {
        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(k, _)| !is_tracking_param(k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    parsed.set_fragment(None);
    parsed.to_string()
}

/// Resolve a possibly-relative href against a base URL and canonicalize it.
///
/// Whitespace around the href is trimmed first. Returns `None` for missing
/// or empty input, or when the base itself does not parse.
pub fn abs_url(base: &str, maybe_rel: Option<&str>) -> Option<String> {
    let href = maybe_rel?.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(base).ok()?;
    let full = base.join(href).ok()?;
    Some(canon_url(full.as_str()))
}

/// Host of an absolute URL, if it has one.
pub fn host_of(u: &str) -> Option<String> {
    Url::parse(u).ok()?.host_str().map(|h| h.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canon_strips_tracking_params() {
        assert_eq!(
            canon_url("https://example.com/a?utm_source=x&id=7&utm_campaign=y"),
            "https://example.com/a?id=7"
        );
        assert_eq!(
            canon_url("https://example.com/a?fbclid=abc"),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_canon_is_case_insensitive_on_names() {
        assert_eq!(
            canon_url("https://example.com/a?UTM_Source=x&Ref=z&page=2"),
            "https://example.com/a?page=2"
        );
    }

    #[test]
    fn test_canon_drops_fragment() {
        assert_eq!(
            canon_url("https://example.com/a#section"),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_canon_equality_for_tracking_variants() {
        let a = canon_url("https://example.com/story?id=1&utm_medium=rss");
        let b = canon_url("https://example.com/story?id=1#top");
        assert_eq!(a, b);
    }

    #[test]
    fn test_canon_preserves_order_and_blank_values() {
        assert_eq!(
            canon_url("https://example.com/a?b=2&a=&utm_id=9&c=3"),
            "https://example.com/a?b=2&a=&c=3"
        );
    }

    #[test]
    fn test_canon_passes_through_unparseable_input() {
        assert_eq!(canon_url("/relative/path"), "/relative/path");
        assert_eq!(canon_url("not a url"), "not a url");
        assert_eq!(canon_url(""), "");
    }

    #[test]
    fn test_abs_url_resolves_relative() {
        assert_eq!(
            abs_url("https://example.com/", Some("/news/2025/widget")),
            Some("https://example.com/news/2025/widget".to_string())
        );
        assert_eq!(
            abs_url("https://example.com/blog/", Some("post-1")),
            Some("https://example.com/blog/post-1".to_string())
        );
    }

    #[test]
    fn test_abs_url_trims_and_canonicalizes() {
        assert_eq!(
            abs_url("https://example.com/", Some("  /a?utm_source=x#frag  ")),
            Some("https://example.com/a".to_string())
        );
    }

    #[test]
    fn test_abs_url_empty_input() {
        assert_eq!(abs_url("https://example.com/", None), None);
        assert_eq!(abs_url("https://example.com/", Some("")), None);
        assert_eq!(abs_url("https://example.com/", Some("   ")), None);
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://news.example.com/x"),
            Some("news.example.com".to_string())
        );
        assert_eq!(host_of("nonsense"), None);
    }
}
