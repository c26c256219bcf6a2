// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Async HTTP client wrapping reqwest.
//!
//! One GET per call with a browser-like User-Agent and an HTML Accept
//! header; several lenders vary or withhold rate markup for bot-looking
//! clients. There are no retries here; a failed fetch is one institution's
//! empty result.

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;

/// Mobile Safari, the profile the tracked rate pages are known to serve.
pub const MOBILE_SAFARI_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
                                    AppleWebKit/605.1.15 (KHTML, like Gecko) \
                                    Version/17.0 Mobile/15E148 Safari/604.1";

/// Desktop Chrome, for pages that gate content on a desktop viewport.
pub const DESKTOP_CHROME_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                     AppleWebKit/537.36 (KHTML, like Gecko) \
                                     Chrome/131.0.0.0 Safari/537.36";

pub const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as UTF-8.
    pub body: String,
}

/// Source of static HTML pages.
///
/// Implemented by [`HttpClient`]; tests and alternative transports supply
/// their own.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url`. `headers` override the fetcher's defaults by name.
    async fn fetch(&self, url: &str, headers: &[(String, String)])
        -> Result<HtmlDocument, FetchError>;
}

/// HTTP client for rate pages.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a client with the given per-request timeout and User-Agent.
    pub fn new(timeout_ms: u64, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_default();

        Self {
            client,
            user_agent: user_agent.to_string(),
        }
    }

    /// The User-Agent and Accept pair every request starts from.
    pub fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("Accept".to_string(), HTML_ACCEPT.to_string()),
        ]
    }

    fn header_map(&self, overrides: &[(String, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&self.user_agent) {
            map.insert(USER_AGENT, ua);
        }
        map.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));

        for (name, value) in overrides {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => {
                    map.insert(n, v);
                }
                _ => tracing::warn!(header = %name, "skipping malformed request header"),
            }
        }
        map
    }
}

/// Parse and check that `url` is an absolute http(s) URL.
pub fn parse_page_url(url: &str) -> Result<url::Url, FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::BadUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::BadUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HtmlDocument, FetchError> {
        let target = parse_page_url(url)?;

        let resp = self
            .client
            .get(target)
            .headers(self.header_map(headers))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        if !resp.status().is_success() {
            tracing::warn!(url, status, "rate page returned non-success status");
        }

        let bytes = resp.bytes().await?;
        let body = String::from_utf8(bytes.to_vec()).map_err(|e| FetchError::Decode(e.to_string()))?;

        tracing::debug!(url, status, bytes = body.len(), "fetched rate page");

        Ok(HtmlDocument {
            url: url.to_string(),
            final_url,
            status,
            body,
        })
    }
}
