//! Redirect resolution
//!
//! Resolves one logical URL to its final non-redirect response by walking the
//! chain of 3xx answers under a hop budget. The chain is local to the worker
//! performing the resolution and is discarded once the URL is settled; the
//! visit record stays keyed by the URL the chain started from.

use crate::crawler::fetcher::{fetch_once, is_redirect, FetchResponse};
use crate::url::normalize_url;
use crate::TrailmapError;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Per-resolution state: the origin URL, the hops walked so far, and the
/// remaining hop budget.
#[derive(Debug, Clone)]
pub struct RedirectChain {
    /// URL the resolution started from
    pub origin: Url,

    /// Intermediate URLs visited, in order (the origin is hops[0] once the
    /// first redirect is taken)
    pub hops: Vec<Url>,

    /// Hops still allowed
    pub remaining: u32,
}

impl RedirectChain {
    fn new(origin: Url, budget: u32) -> Self {
        Self {
            origin,
            hops: Vec::new(),
            remaining: budget,
        }
    }
}

/// The final, non-redirect response for a logical URL
#[derive(Debug)]
pub struct ResolvedPage {
    /// URL that produced the final response
    pub final_url: Url,

    /// Status code of the final response
    pub status: u16,

    /// Content-Type of the final response
    pub content_type: Option<String>,

    /// Body of the final response
    pub body: String,
}

/// Ways a redirect resolution can fail
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("redirect limit reached for {}: {} hops walked", .chain.origin, .chain.hops.len())]
    BudgetExceeded { chain: RedirectChain },

    #[error("redirect loop detected at {url}")]
    RedirectLoop { url: Url, chain: RedirectChain },

    #[error("redirect from {url} carried no Location header")]
    MissingLocation { url: Url },

    #[error("redirect from {url} has unusable Location '{location}'")]
    BadLocation { url: Url, location: String },

    #[error(transparent)]
    Fetch(#[from] TrailmapError),
}

/// Resolves `start` to its final non-redirect response
///
/// Each hop issues exactly one GET (no retry). A chain of `k` redirects
/// succeeds iff `k <= max_redirect`; encountering a redirect with no budget
/// left fails with [`ResolveError::BudgetExceeded`] carrying the chain walked
/// so far. Only the first `Location` header of a response is honored; a
/// missing, unparsable, or non-http(s) target is a resolution failure rather
/// than a silent stop. Revisiting a URL already on the chain fails with
/// [`ResolveError::RedirectLoop`].
pub async fn resolve(
    client: &Client,
    start: &Url,
    max_redirect: u32,
) -> Result<ResolvedPage, ResolveError> {
    let mut chain = RedirectChain::new(start.clone(), max_redirect);
    let mut current = start.clone();

    loop {
        let response: FetchResponse = fetch_once(client, &current).await?;

        if !is_redirect(response.status) {
            return Ok(ResolvedPage {
                final_url: current,
                status: response.status,
                content_type: response.content_type,
                body: response.body,
            });
        }

        let location = match response.location {
            Some(location) => location,
            None => return Err(ResolveError::MissingLocation { url: current }),
        };

        let next = match resolve_location(&current, &location) {
            Some(next) => next,
            None => {
                return Err(ResolveError::BadLocation {
                    url: current,
                    location,
                })
            }
        };

        if chain.remaining == 0 {
            chain.hops.push(current);
            return Err(ResolveError::BudgetExceeded { chain });
        }

        if next == chain.origin || chain.hops.contains(&next) {
            return Err(ResolveError::RedirectLoop { url: next, chain });
        }

        tracing::debug!("redirect to {} from {}", next, current);
        chain.remaining -= 1;
        chain.hops.push(current);
        current = next;
    }
}

/// Resolves a Location header value against the URL that answered with it
fn resolve_location(current: &Url, location: &str) -> Option<Url> {
    let joined = current.join(location).ok()?;
    normalize_url(joined.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_location_absolute() {
        let current = Url::parse("http://example.com/a").unwrap();
        let next = resolve_location(&current, "http://example.com/b").unwrap();
        assert_eq!(next.as_str(), "http://example.com/b");
    }

    #[test]
    fn test_resolve_location_relative() {
        let current = Url::parse("http://example.com/dir/page").unwrap();
        let next = resolve_location(&current, "../other").unwrap();
        assert_eq!(next.as_str(), "http://example.com/other");
    }

    #[test]
    fn test_resolve_location_normalizes() {
        let current = Url::parse("http://example.com/a").unwrap();
        let next = resolve_location(&current, "http://WWW.EXAMPLE.COM/b/#frag").unwrap();
        assert_eq!(next.as_str(), "http://example.com/b");
    }

    #[test]
    fn test_resolve_location_rejects_other_schemes() {
        let current = Url::parse("http://example.com/a").unwrap();
        assert!(resolve_location(&current, "ftp://example.com/b").is_none());
    }

    // Chain walking against live responses (budget boundary, loops, missing
    // Location) is covered by the wiremock integration tests.
}
