//! Crawl report generation
//!
//! The report is computed once, after the frontier has drained, from the
//! full visit-record map.

use crate::crawler::{Frontier, VisitKind, VisitRecord, VisitStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Final summary of a crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Normalized seed URL
    pub root: Url,

    /// Host the crawl was restricted to
    pub root_host: String,

    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// Wall-clock crawl duration
    pub elapsed: Duration,

    /// Record counts by visit kind
    pub counts: HashMap<VisitKind, u64>,

    /// Number of URLs resolved to a final response
    pub pages_fetched: u64,

    /// Number of URLs that ended in an error (fetch failures plus exhausted
    /// redirect budgets)
    pub errors: u64,

    /// Distinct offsite links skipped at enqueue time
    pub offsite_skipped: u64,

    /// Total outbound links discovered across all fetched pages
    pub total_links: u64,

    /// The full visit-record map, for inspection
    pub records: HashMap<Url, VisitRecord>,

    /// The distinct offsite URLs that were skipped
    pub offsite_urls: Vec<Url>,
}

impl CrawlReport {
    /// Builds the report from a drained frontier
    pub fn from_frontier(
        root: Url,
        root_host: String,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        frontier: &Frontier,
    ) -> Self {
        let records = frontier.records();

        let mut counts: HashMap<VisitKind, u64> = HashMap::new();
        let mut total_links: u64 = 0;

        for record in records.values() {
            *counts.entry(record.status.kind()).or_insert(0) += 1;

            if let VisitStatus::Fetched { links, .. } = &record.status {
                total_links += links.len() as u64;
            }
        }

        let pages_fetched = counts.get(&VisitKind::Fetched).copied().unwrap_or(0);
        let errors = counts.get(&VisitKind::Failed).copied().unwrap_or(0)
            + counts.get(&VisitKind::RedirectExceeded).copied().unwrap_or(0);

        Self {
            root,
            root_host,
            started_at,
            elapsed,
            counts,
            pages_fetched,
            errors,
            offsite_skipped: frontier.offsite_count() as u64,
            total_links,
            records,
            offsite_urls: frontier.offsite_urls(),
        }
    }

    /// Record count for one visit kind
    pub fn count(&self, kind: VisitKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Target:");
    println!("  Root URL: {}", report.root);
    println!("  Root host: {}", report.root_host);
    println!(
        "  Started: {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Duration: {:.2}s", report.elapsed.as_secs_f64());
    println!();

    println!("Overview:");
    println!("  URLs seen: {}", report.records.len());
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Links discovered: {}", report.total_links);
    println!("  Offsite links skipped: {}", report.offsite_skipped);
    println!();

    println!("URLs by outcome:");
    // Sort outcomes by count (descending)
    let mut kind_counts: Vec<_> = report.counts.iter().collect();
    kind_counts.sort_by(|a, b| b.1.cmp(a.1));

    let total = report.records.len() as u64;
    for (kind, count) in kind_counts {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", kind.label(), count, percentage);
    }
    println!();

    if report.errors > 0 {
        println!("Errors:");
        println!("  failed: {}", report.count(VisitKind::Failed));
        println!(
            "  redirect-exceeded: {}",
            report.count(VisitKind::RedirectExceeded)
        );
        println!();
    }
}
