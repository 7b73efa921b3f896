//! HTTP fetcher implementation
//!
//! This module is the crawler's only contact with the network. It builds the
//! shared HTTP client and issues single GET requests: one request per call,
//! no retries, no implicit redirect following. Redirect chains are walked
//! explicitly by the resolver so the hop budget stays under the crawler's
//! control.

use crate::config::Config;
use crate::TrailmapError;
use reqwest::{header, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Response surface exposed to the rest of the crawler
///
/// Only the parts of an HTTP response the crawler acts on: the status code,
/// the first `Location` header (for redirects), the `Content-Type` header,
/// and the body.
#[derive(Debug)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// First Location header value, if any
    pub location: Option<String>,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    /// Response body
    pub body: String,
}

/// Builds the HTTP client shared by all workers
///
/// Redirects are handled manually by the resolver, so the client's own
/// redirect policy is disabled.
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues a single GET request for the given URL
///
/// One attempt, no retry: a failed hop fails the URL it belongs to. Errors
/// are classified into timeouts and other transport failures.
pub async fn fetch_once(client: &Client, url: &Url) -> Result<FetchResponse, TrailmapError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status().as_u16();

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let body = response.text().await.map_err(|e| TrailmapError::Body {
        url: url.to_string(),
        source: e,
    })?;

    Ok(FetchResponse {
        status,
        location,
        content_type,
        body,
    })
}

fn classify_error(url: &Url, error: reqwest::Error) -> TrailmapError {
    if error.is_timeout() {
        TrailmapError::Timeout {
            url: url.to_string(),
        }
    } else {
        TrailmapError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Returns true for the redirect statuses the crawler follows
///
/// 308 is deliberately absent from this set.
pub fn is_redirect(status: u16) -> bool {
    matches!(status, 300 | 301 | 302 | 303 | 307)
}

/// Returns true when a Content-Type header denotes parseable HTML
///
/// The parameter portion of the header (`; charset=...`) is ignored.
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };

    let mime = value.split(';').next().unwrap_or("").trim();
    matches!(mime, "text/html" | "application/xhtml+xml" | "application/xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_build_http_client() {
        let config = Config::for_target("http://example.com/");
        let client = build_http_client(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_redirect_statuses() {
        for status in [300, 301, 302, 303, 307] {
            assert!(is_redirect(status), "{} should be a redirect", status);
        }

        for status in [200, 204, 304, 308, 400, 404, 500] {
            assert!(!is_redirect(status), "{} should not be a redirect", status);
        }
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type(Some("text/html")));
        assert!(is_html_content_type(Some("text/html; charset=utf-8")));
        assert!(is_html_content_type(Some("application/xml")));
        assert!(!is_html_content_type(Some("application/pdf")));
        assert!(!is_html_content_type(Some("image/png")));
        assert!(!is_html_content_type(None));
    }

    // Fetch behavior against real responses is covered by the wiremock
    // integration tests.
}
