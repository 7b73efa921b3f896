//! Crawler module
//!
//! This module contains the core crawling machinery:
//! - The deduplicating frontier with drain detection
//! - Single-attempt HTTP fetching
//! - Per-URL redirect chain resolution
//! - HTML link extraction
//! - The worker loop and the coordinator that drives the pool

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod redirect;
mod worker;

pub use coordinator::{run_crawl, Coordinator, CrawlHandle, CrawlPhase};
pub use fetcher::{
    build_http_client, fetch_once, is_html_content_type, is_redirect, FetchResponse,
};
pub use frontier::{Frontier, VisitKind, VisitRecord, VisitStatus};
pub use parser::{parse_html, ParsedPage};
pub use redirect::{resolve, RedirectChain, ResolveError, ResolvedPage};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::TrailmapError;

/// Runs a complete crawl operation
///
/// Convenience wrapper over [`run_crawl`]: seeds the frontier with the
/// configured target, runs the worker pool until the frontier drains, and
/// returns the final report.
pub async fn crawl(config: Config) -> Result<CrawlReport, TrailmapError> {
    run_crawl(config).await
}
