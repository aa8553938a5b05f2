//! HTTP fetching with retry/backoff and charset repair.
//!
//! The pipeline talks to the network through the [`Fetch`] trait so tests
//! can inject a canned transport. The real implementation is a
//! [`reqwest::Client`] built once in `main` and wrapped in [`RetryFetch`],
//! a decorator that adds bounded exponential backoff with jitter for the
//! transient HTTP statuses worth retrying.
//!
//! # Retry Strategy
//!
//! - Up to 3 attempts total
//! - Exponential backoff starting at 1 second, capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//! - Only 429/500/502/503/504 responses are retried; every other failure
//!   (timeouts, DNS, 4xx) surfaces immediately

use rand::{Rng, rng};
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Fixed per-request timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP statuses treated as transient and worth a retry.
const RETRYABLE_STATUS: &[u16] = &[429, 500, 502, 503, 504];

const USER_AGENT: &str = concat!(
    "TopicFeedsBot/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/topic-feeds/topic-feeds)"
);

/// Trait for fetching a URL to decoded text.
pub trait Fetch {
    /// GET `url` and return the response body as text.
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// Build the process-wide HTTP client: browser-like header set, fixed
/// timeout. Constructed once and passed explicitly into [`HttpFetcher`].
pub fn build_client() -> Result<reqwest::Client, Box<dyn Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.7"),
    );
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(FETCH_TIMEOUT)
        .build()?;
    Ok(client)
}

/// [`Fetch`] implementation backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let resp = self.client.get(url).send().await?;
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let resp = resp.error_for_status()?;
        let bytes = resp.bytes().await?;
        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

/// Decode a response body without trusting a mislabeled charset header.
///
/// Bytes that already decode as UTF-8 are taken as-is; otherwise the
/// `Content-Type` charset label is tried via `encoding_rs`, and as a last
/// resort the body is decoded as Windows-1252, which maps every byte.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    if let Some(label) = charset_label(content_type) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (decoded, _, _) = encoding.decode(bytes);
            return decoded.into_owned();
        }
    }
    let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    decoded.into_owned()
}

fn charset_label(content_type: Option<&str>) -> Option<String> {
    content_type?.split(';').find_map(|part| {
        let part = part.trim();
        match (part.get(..8), part.get(8..)) {
            (Some(key), Some(value)) if key.eq_ignore_ascii_case("charset=") && !value.is_empty() => {
                Some(value.trim_matches('"').to_string())
            }
            _ => None,
        }
    })
}

fn is_retryable(e: &(dyn Error + 'static)) -> bool {
    e.downcast_ref::<reqwest::Error>()
        .and_then(|re| re.status())
        .map(|s| RETRYABLE_STATUS.contains(&s.as_u16()))
        .unwrap_or(false)
}

/// Decorator that adds exponential backoff retry logic to any [`Fetch`]
/// implementation.
///
/// The delay between retries follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    /// Maximum number of retries after the first attempt.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: Duration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: Fetch,
{
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Fetch for RetryFetch<T>
where
    T: Fetch,
{
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;

                    if !is_retryable(e.as_ref()) {
                        return Err(e);
                    }
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u128,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FlakyFetcher {
        calls: RefCell<usize>,
    }

    impl Fetch for FlakyFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, Box<dyn Error>> {
            *self.calls.borrow_mut() += 1;
            Err("connection reset".into())
        }
    }

    #[tokio::test]
    async fn test_non_http_errors_are_not_retried() {
        let inner = FlakyFetcher {
            calls: RefCell::new(0),
        };
        let fetcher = RetryFetch::new(inner, 2, Duration::from_millis(1));
        let res = fetcher.fetch("https://example.com/").await;
        assert!(res.is_err());
        assert_eq!(*fetcher.inner.calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_retries_on_503_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        let fetcher = RetryFetch::new(
            HttpFetcher::new(build_client().unwrap()),
            2,
            Duration::from_millis(5),
        );
        let body = fetcher
            .fetch(&format!("{}/flaky", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "recovered");
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = RetryFetch::new(
            HttpFetcher::new(build_client().unwrap()),
            2,
            Duration::from_millis(5),
        );
        let res = fetcher.fetch(&format!("{}/down", server.uri())).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_404_fails_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = RetryFetch::new(
            HttpFetcher::new(build_client().unwrap()),
            2,
            Duration::from_millis(5),
        );
        let res = fetcher.fetch(&format!("{}/missing", server.uri())).await;
        assert!(res.is_err());
    }

    #[test]
    fn test_decode_body_prefers_valid_utf8_over_label() {
        // UTF-8 bytes mislabeled as latin-1 must not be re-decoded.
        let body = "naïve café".as_bytes();
        let out = decode_body(body, Some("text/html; charset=iso-8859-1"));
        assert_eq!(out, "naïve café");
    }

    #[test]
    fn test_decode_body_uses_charset_label() {
        // "café" in latin-1: 0xE9 is not valid UTF-8.
        let body = [0x63, 0x61, 0x66, 0xE9];
        let out = decode_body(&body, Some("text/html; charset=ISO-8859-1"));
        assert_eq!(out, "café");
    }

    #[test]
    fn test_decode_body_falls_back_to_windows_1252() {
        let body = [0x93, 0x71, 0x75, 0x6F, 0x74, 0x65, 0x94];
        let out = decode_body(&body, None);
        assert_eq!(out, "\u{201C}quote\u{201D}");
    }

    #[test]
    fn test_charset_label_parsing() {
        assert_eq!(
            charset_label(Some("text/html; charset=utf-8")),
            Some("utf-8".to_string())
        );
        assert_eq!(
            charset_label(Some("text/html; CHARSET=\"Shift_JIS\"")),
            Some("Shift_JIS".to_string())
        );
        assert_eq!(charset_label(Some("text/html")), None);
        assert_eq!(charset_label(None), None);
    }
}
