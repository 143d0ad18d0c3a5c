//! Best-effort page title lookup for bookmarks
//!
//! The contract is "always returns a string, possibly empty". Every failure
//! is logged and swallowed; callers fall back to the bookmark URL.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::TitleConfig;

static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title(?:\s[^>]*)?>([^<]*)</title\s*>").expect("title regex"));

#[async_trait]
pub trait TitleResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> String;
}

/// Fetches the page over HTTP with a fixed timeout
pub struct HttpTitleResolver {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpTitleResolver {
    pub fn new(config: &TitleConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(concat!("pinbox-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Reads the body chunk by chunk and stops at `max_body_bytes` or as soon
    /// as a closing title tag has arrived, whichever comes first.
    async fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        let mut body: Vec<u8> = Vec::new();
        while body.len() < self.max_body_bytes {
            let Some(chunk) = response.chunk().await? else {
                break;
            };
            let take = chunk.len().min(self.max_body_bytes - body.len());
            body.extend_from_slice(&chunk[..take]);

            if contains_title_end(&body) {
                break;
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl TitleResolver for HttpTitleResolver {
    async fn resolve(&self, url: &str) -> String {
        match self.fetch(url).await {
            Ok(body) => extract_title(&body).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("Title fetch for {} failed: {}", url, e);
                String::new()
            }
        }
    }
}

/// Never fetches; every bookmark without a title gets its URL
pub struct DisabledTitleResolver;

#[async_trait]
impl TitleResolver for DisabledTitleResolver {
    async fn resolve(&self, _url: &str) -> String {
        String::new()
    }
}

fn contains_title_end(body: &[u8]) -> bool {
    body.windows(7)
        .any(|window| window.eq_ignore_ascii_case(b"</title"))
}

/// Text of the first `<title>` element, trimmed. Empty titles count as missing.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE_TAG
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><TITLE> Example Domain </TITLE></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Example Domain"));
    }

    #[test]
    fn test_extract_title_with_attributes_and_newlines() {
        let html = "<head>\n<title data-rh=\"true\">\nRust\n</title>";
        assert_eq!(extract_title(html).as_deref(), Some("Rust"));
    }

    #[test]
    fn test_first_title_wins() {
        let html = "<title>First</title><svg><title>Second</title></svg>";
        assert_eq!(extract_title(html).as_deref(), Some("First"));
    }

    #[test]
    fn test_missing_or_empty_title() {
        assert_eq!(extract_title("<html><body>no head</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
        assert_eq!(extract_title("<titles>nope</titles>"), None);
    }

    #[test]
    fn test_contains_title_end() {
        assert!(contains_title_end(b"<head><title>x</TITLE>"));
        assert!(!contains_title_end(b"<head><title>still going"));
        assert!(!contains_title_end(b"</tit"));
    }

    #[tokio::test]
    async fn test_disabled_resolver_returns_empty() {
        assert_eq!(DisabledTitleResolver.resolve("https://example.com").await, "");
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_empty() {
        let resolver = HttpTitleResolver::new(&TitleConfig {
            fetch_enabled: true,
            fetch_timeout_secs: 2,
            max_body_bytes: 1024,
        })
        .unwrap();

        // Port 9 on loopback refuses connections
        assert_eq!(resolver.resolve("http://127.0.0.1:9/").await, "");
    }
}
