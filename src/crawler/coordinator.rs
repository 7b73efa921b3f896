//! Crawl coordination
//!
//! The coordinator owns the frontier and the worker pool: it seeds the
//! frontier, starts `max_tasks` workers, waits for the frontier to drain,
//! closes it so the workers exit, joins them, and builds the final report.
//! A coordinator crawls exactly once; `run` consumes it.

use crate::config::{validate, Config};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::Frontier;
use crate::crawler::worker::run_worker;
use crate::output::CrawlReport;
use crate::url::{extract_host, normalize_url};
use crate::{TrailmapError, UrlError};
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Lifecycle of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Constructed, nothing fetched yet
    Idle,
    /// Workers are processing the frontier
    Running,
    /// Waiting for the outstanding-work counter to reach zero
    Draining,
    /// Frontier closed, workers joined, report built
    Done,
}

/// Handle for cancelling a crawl from outside
///
/// Cancelling closes the frontier: queued URLs are abandoned (left
/// `Pending`), in-flight fetches finish and are recorded, and `run` returns
/// with a partial report.
#[derive(Clone)]
pub struct CrawlHandle {
    frontier: Arc<Frontier>,
}

impl CrawlHandle {
    pub fn cancel(&self) {
        tracing::info!("crawl cancelled, closing frontier");
        self.frontier.close();
    }
}

/// Main crawl coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    frontier: Arc<Frontier>,
    client: Client,
    seed: Url,
    root_host: String,
}

impl Coordinator {
    /// Creates a new coordinator for the configured target
    ///
    /// Configuration and seed problems surface here, before any worker
    /// starts; they are the only crawl-fatal errors.
    pub fn new(config: Config) -> Result<Self, TrailmapError> {
        validate(&config)?;

        let seed = normalize_url(&config.crawler.target)?;
        let root_host = extract_host(&seed).ok_or(UrlError::MissingHost)?;
        let client = build_http_client(&config)?;

        Ok(Self {
            config: Arc::new(config),
            frontier: Arc::new(Frontier::new()),
            client,
            seed,
            root_host,
        })
    }

    /// Returns a cancellation handle for this crawl
    pub fn handle(&self) -> CrawlHandle {
        CrawlHandle {
            frontier: self.frontier.clone(),
        }
    }

    /// Runs the crawl to completion and returns the report
    ///
    /// Consuming `self` is what enforces the one-shot lifecycle: once this
    /// returns, the coordinator is gone and `Done` cannot be re-entered.
    pub async fn run(self) -> Result<CrawlReport, TrailmapError> {
        let started_at = chrono::Utc::now();
        let start = std::time::Instant::now();
        let mut phase = CrawlPhase::Idle;

        tracing::info!(
            "starting crawl of {} (host {}) with {} workers, {} redirect hops",
            self.seed,
            self.root_host,
            self.config.crawler.max_tasks,
            self.config.crawler.max_redirect
        );

        // Idle -> Running: seed the frontier, start the pool.
        self.frontier.offer(&self.seed);

        let mut workers = JoinSet::new();
        for worker_id in 0..self.config.crawler.max_tasks as usize {
            workers.spawn(run_worker(
                worker_id,
                self.config.clone(),
                self.client.clone(),
                self.frontier.clone(),
                self.root_host.clone(),
            ));
        }
        phase = self.advance(phase, CrawlPhase::Running);

        // Running -> Draining: the frontier's counter is the only authority
        // on completion; the coordinator just waits on it.
        phase = self.advance(phase, CrawlPhase::Draining);
        self.frontier.wait_drained().await;

        // Draining -> Done: close the frontier so every worker's next take()
        // returns None, then join the pool.
        self.frontier.close();
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("worker task failed: {}", e);
            }
        }
        phase = self.advance(phase, CrawlPhase::Done);
        debug_assert_eq!(phase, CrawlPhase::Done);

        let report = CrawlReport::from_frontier(
            self.seed.clone(),
            self.root_host.clone(),
            started_at,
            start.elapsed(),
            &self.frontier,
        );

        tracing::info!(
            "crawl complete: {} URLs seen, {} fetched, {} offsite skips in {:?}",
            report.records.len(),
            report.pages_fetched,
            report.offsite_skipped,
            report.elapsed
        );

        Ok(report)
    }

    fn advance(&self, from: CrawlPhase, to: CrawlPhase) -> CrawlPhase {
        tracing::debug!("crawl phase {:?} -> {:?}", from, to);
        to
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use trailmap::config::Config;
/// use trailmap::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::for_target("http://example.com/");
/// let report = run_crawl(config).await?;
/// println!("fetched {} pages", report.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, TrailmapError> {
    Coordinator::new(config)?.run().await
}
