//! The crawl frontier
//!
//! A deduplicating work queue shared by all workers. The frontier owns the
//! only shared mutable state of a crawl: the visit-record map (which doubles
//! as the seen-set), the FIFO queue of URLs awaiting a worker, and the
//! outstanding-work counter that drives termination detection.
//!
//! All mutations happen inside short, non-suspending critical sections under
//! one mutex; workers suspend only on the `Notify` wakeups, never while
//! holding the lock. A URL is enqueued at most once per crawl, and every
//! enqueued URL is eventually accounted for by exactly one `mark_done` (or
//! un-counted by `close` if it is discarded before a worker takes it), which
//! is what makes `wait_drained` reliable.

use crate::url::normalize_url;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::Notify;
use url::Url;

/// Coarse classification of a visit outcome, used for report counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitKind {
    Pending,
    Fetched,
    Failed,
    RedirectExceeded,
}

impl VisitKind {
    pub fn label(&self) -> &'static str {
        match self {
            VisitKind::Pending => "pending",
            VisitKind::Fetched => "fetched",
            VisitKind::Failed => "failed",
            VisitKind::RedirectExceeded => "redirect-exceeded",
        }
    }
}

/// Outcome of visiting one URL
#[derive(Debug, Clone)]
pub enum VisitStatus {
    /// Enqueued but not yet resolved; also the final state of URLs abandoned
    /// by cancellation
    Pending,

    /// Resolved to a non-redirect response
    Fetched {
        /// Status code of the final response
        status_code: u16,
        /// Page title, when the body was parseable HTML
        title: Option<String>,
        /// Outbound links discovered (empty for non-HTML and non-200 pages)
        links: Vec<Url>,
        /// Asset references discovered, for the sitemap output
        assets: Vec<Url>,
    },

    /// Fetch or redirect resolution failed
    Failed { error: String },

    /// Redirect hop budget exhausted
    RedirectExceeded { chain: Vec<Url> },
}

impl VisitStatus {
    pub fn kind(&self) -> VisitKind {
        match self {
            VisitStatus::Pending => VisitKind::Pending,
            VisitStatus::Fetched { .. } => VisitKind::Fetched,
            VisitStatus::Failed { .. } => VisitKind::Failed,
            VisitStatus::RedirectExceeded { .. } => VisitKind::RedirectExceeded,
        }
    }
}

/// The permanent outcome record for one normalized URL
///
/// Created the instant the URL is first offered (this is the dedup gate) and
/// completed at most once, by the worker that processed it.
#[derive(Debug, Clone)]
pub struct VisitRecord {
    pub url: Url,
    pub status: VisitStatus,
}

impl VisitRecord {
    fn new(url: Url) -> Self {
        Self {
            url,
            status: VisitStatus::Pending,
        }
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    /// URLs awaiting a worker
    queue: VecDeque<Url>,

    /// One record per URL ever offered; the key set is the seen-set
    records: HashMap<Url, VisitRecord>,

    /// Distinct offsite URLs skipped at enqueue time (no VisitRecord)
    offsite: HashSet<Url>,

    /// Offered-but-not-completed count; zero with an empty queue means
    /// drained
    outstanding: usize,

    closed: bool,
}

impl FrontierState {
    fn is_drained(&self) -> bool {
        self.outstanding == 0 && self.queue.is_empty()
    }
}

/// The deduplicating work queue of a crawl
pub struct Frontier {
    state: Mutex<FrontierState>,
    work_ready: Notify,
    drained: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            work_ready: Notify::new(),
            drained: Notify::new(),
        }
    }

    /// Offers a URL for crawling
    ///
    /// The URL is normalized; if its normal form was already offered during
    /// this crawl (or the frontier is closed), nothing happens and `false`
    /// is returned. Otherwise a `Pending` record is created, the URL is
    /// queued, the outstanding-work counter is incremented, and one waiting
    /// taker is woken.
    ///
    /// Seen-check and enqueue are one critical section, so two workers
    /// offering the same URL concurrently cannot both enqueue it.
    pub fn offer(&self, url: &Url) -> bool {
        let normalized = match normalize_url(url.as_str()) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!("not offering unnormalizable URL {}: {}", url, e);
                return false;
            }
        };

        {
            let mut state = self.state.lock().unwrap();

            if state.closed || state.records.contains_key(&normalized) {
                return false;
            }

            state
                .records
                .insert(normalized.clone(), VisitRecord::new(normalized.clone()));
            state.queue.push_back(normalized);
            state.outstanding += 1;
        }

        self.work_ready.notify_one();
        true
    }

    /// Takes the next URL to crawl, suspending until one is available
    ///
    /// Returns `None` once the frontier is closed; that is the worker's exit
    /// signal.
    pub async fn take(&self) -> Option<Url> {
        loop {
            // Register interest before checking state so a wakeup between
            // the check and the await is not lost.
            let notified = self.work_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().unwrap();

                if state.closed {
                    return None;
                }

                if let Some(url) = state.queue.pop_front() {
                    return Some(url);
                }
            }

            notified.await;
        }
    }

    /// Records the outcome for a taken URL and retires its unit of work
    ///
    /// A record transitions out of `Pending` at most once; a second
    /// completion for the same URL is ignored (and logged) so the counter
    /// cannot underflow. When the counter reaches zero with an empty queue
    /// the frontier is drained and drain-waiters are woken.
    pub fn mark_done(&self, url: &Url, outcome: VisitStatus) {
        let newly_drained = {
            let mut state = self.state.lock().unwrap();

            match state.records.get_mut(url) {
                Some(record) if matches!(record.status, VisitStatus::Pending) => {
                    record.status = outcome;
                }
                Some(_) => {
                    tracing::warn!("visit record for {} completed more than once", url);
                    return;
                }
                None => {
                    tracing::warn!("mark_done for unknown URL {}", url);
                    return;
                }
            }

            state.outstanding -= 1;
            state.is_drained()
        };

        if newly_drained {
            tracing::debug!("frontier drained");
            self.drained.notify_waiters();
        }
    }

    /// Records an offsite link skipped at enqueue time
    ///
    /// Offsite URLs never receive a visit record and never touch the queue;
    /// they are tracked in a deduplicated set for the final report. Returns
    /// true when the URL was not already in the set.
    pub fn record_offsite(&self, url: &Url) -> bool {
        let mut state = self.state.lock().unwrap();
        state.offsite.insert(url.clone())
    }

    /// Suspends the caller until the frontier is drained
    ///
    /// Drained means the outstanding-work counter is zero and the queue is
    /// empty: nothing left to do and nothing in flight.
    pub async fn wait_drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.state.lock().unwrap().is_drained() {
                return;
            }

            notified.await;
        }
    }

    /// Closes the frontier
    ///
    /// Queued-but-untaken URLs are discarded and un-counted (their records
    /// stay `Pending`), all blocked takers are woken to exit, and no further
    /// offers are accepted. In-flight URLs are unaffected: their workers
    /// still call `mark_done`, so the counter stays consistent and
    /// `wait_drained` completes once they finish.
    pub fn close(&self) {
        let discarded = {
            let mut state = self.state.lock().unwrap();

            if state.closed {
                return;
            }

            state.closed = true;
            let discarded = state.queue.len();
            state.outstanding -= discarded;
            state.queue.clear();
            discarded
        };

        if discarded > 0 {
            tracing::debug!("discarded {} queued URLs on close", discarded);
        }

        self.work_ready.notify_waiters();
        self.drained.notify_waiters();
    }

    /// Number of distinct URLs ever offered
    pub fn seen_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    /// Number of URLs waiting for a worker
    pub fn queue_len(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// Snapshot of all visit records
    pub fn records(&self) -> HashMap<Url, VisitRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Snapshot of the offsite URLs skipped at enqueue time
    pub fn offsite_urls(&self) -> Vec<Url> {
        self.state.lock().unwrap().offsite.iter().cloned().collect()
    }

    /// Number of distinct offsite URLs skipped
    pub fn offsite_count(&self) -> usize {
        self.state.lock().unwrap().offsite.len()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_offer_dedup() {
        let frontier = Frontier::new();

        assert!(frontier.offer(&url("http://example.com/page")));
        assert!(!frontier.offer(&url("http://example.com/page")));

        assert_eq!(frontier.seen_count(), 1);
        assert_eq!(frontier.queue_len(), 1);
    }

    #[test]
    fn test_offer_dedups_equivalent_forms() {
        let frontier = Frontier::new();

        assert!(frontier.offer(&url("http://EXAMPLE.com/a/")));
        assert!(!frontier.offer(&url("http://example.com/a")));
        assert!(!frontier.offer(&url("http://www.example.com/a#frag")));

        assert_eq!(frontier.seen_count(), 1);
    }

    #[test]
    fn test_offsite_not_enqueued() {
        let frontier = Frontier::new();
        frontier.offer(&url("http://example.com/"));

        assert!(frontier.record_offsite(&url("http://other.com/x")));
        assert!(!frontier.record_offsite(&url("http://other.com/x")));

        assert_eq!(frontier.offsite_count(), 1);
        assert_eq!(frontier.queue_len(), 1);
        assert_eq!(frontier.seen_count(), 1);
        assert!(!frontier.records().contains_key(&url("http://other.com/x")));
    }

    #[tokio::test]
    async fn test_take_returns_offered_url() {
        let frontier = Frontier::new();
        frontier.offer(&url("http://example.com/page"));

        let taken = frontier.take().await;
        assert_eq!(taken, Some(url("http://example.com/page")));
        assert_eq!(frontier.queue_len(), 0);
    }

    #[tokio::test]
    async fn test_take_returns_none_when_closed() {
        let frontier = Frontier::new();
        frontier.close();

        assert_eq!(frontier.take().await, None);
    }

    #[tokio::test]
    async fn test_take_wakes_on_offer() {
        let frontier = Arc::new(Frontier::new());

        let taker = {
            let frontier = frontier.clone();
            tokio::spawn(async move { frontier.take().await })
        };

        // Give the taker a chance to block first.
        tokio::time::sleep(Duration::from_millis(20)).await;
        frontier.offer(&url("http://example.com/late"));

        let taken = tokio::time::timeout(Duration::from_secs(1), taker)
            .await
            .expect("taker did not wake")
            .unwrap();
        assert_eq!(taken, Some(url("http://example.com/late")));
    }

    #[tokio::test]
    async fn test_blocked_takers_wake_on_close() {
        let frontier = Arc::new(Frontier::new());

        let takers: Vec<_> = (0..3)
            .map(|_| {
                let frontier = frontier.clone();
                tokio::spawn(async move { frontier.take().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        frontier.close();

        for taker in takers {
            let taken = tokio::time::timeout(Duration::from_secs(1), taker)
                .await
                .expect("taker did not wake on close")
                .unwrap();
            assert_eq!(taken, None);
        }
    }

    #[tokio::test]
    async fn test_wait_drained_after_work_completes() {
        let frontier = Frontier::new();
        let page = url("http://example.com/page");

        frontier.offer(&page);
        let taken = frontier.take().await.unwrap();
        frontier.mark_done(
            &taken,
            VisitStatus::Fetched {
                status_code: 200,
                title: None,
                links: vec![],
                assets: vec![],
            },
        );

        tokio::time::timeout(Duration::from_secs(1), frontier.wait_drained())
            .await
            .expect("wait_drained did not complete");
    }

    #[tokio::test]
    async fn test_wait_drained_blocks_while_work_in_flight() {
        let frontier = Frontier::new();
        let page = url("http://example.com/page");

        frontier.offer(&page);
        let taken = frontier.take().await.unwrap();

        // In flight: the queue is empty but the counter is nonzero, so
        // wait_drained must not return yet.
        let premature =
            tokio::time::timeout(Duration::from_millis(50), frontier.wait_drained()).await;
        assert!(premature.is_err(), "wait_drained returned with work in flight");

        frontier.mark_done(&taken, VisitStatus::Failed { error: "x".into() });

        tokio::time::timeout(Duration::from_secs(1), frontier.wait_drained())
            .await
            .expect("wait_drained did not complete after mark_done");
    }

    #[tokio::test]
    async fn test_close_discards_queued_work_but_waits_for_in_flight() {
        let frontier = Frontier::new();

        frontier.offer(&url("http://example.com/taken"));
        frontier.offer(&url("http://example.com/queued"));

        let taken = frontier.take().await.unwrap();
        frontier.close();

        // The queued URL is discarded; only the in-flight one holds the
        // counter open.
        let premature =
            tokio::time::timeout(Duration::from_millis(50), frontier.wait_drained()).await;
        assert!(premature.is_err());

        frontier.mark_done(
            &taken,
            VisitStatus::Fetched {
                status_code: 200,
                title: None,
                links: vec![],
                assets: vec![],
            },
        );

        tokio::time::timeout(Duration::from_secs(1), frontier.wait_drained())
            .await
            .expect("wait_drained did not complete after cancellation");

        // The discarded URL keeps its Pending record.
        let records = frontier.records();
        let queued = records.get(&url("http://example.com/queued")).unwrap();
        assert!(matches!(queued.status, VisitStatus::Pending));
    }

    #[tokio::test]
    async fn test_offer_rejected_after_close() {
        let frontier = Frontier::new();
        frontier.close();

        assert!(!frontier.offer(&url("http://example.com/late")));
        assert_eq!(frontier.seen_count(), 0);
    }

    #[tokio::test]
    async fn test_double_mark_done_is_ignored() {
        let frontier = Frontier::new();
        let page = url("http://example.com/page");

        frontier.offer(&page);
        let taken = frontier.take().await.unwrap();

        frontier.mark_done(&taken, VisitStatus::Failed { error: "first".into() });
        frontier.mark_done(&taken, VisitStatus::Failed { error: "second".into() });

        let records = frontier.records();
        match &records.get(&page).unwrap().status {
            VisitStatus::Failed { error } => assert_eq!(error, "first"),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_offers_enqueue_once() {
        let frontier = Arc::new(Frontier::new());

        let offers: Vec<_> = (0..16)
            .map(|_| {
                let frontier = frontier.clone();
                tokio::spawn(async move { frontier.offer(&url("http://example.com/contested")) })
            })
            .collect();

        let mut accepted = 0;
        for offer in offers {
            if offer.await.unwrap() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(frontier.seen_count(), 1);
        assert_eq!(frontier.queue_len(), 1);
    }
}
