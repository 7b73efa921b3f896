//! Worker loop
//!
//! Each worker repeats: take a URL from the frontier, resolve its redirect
//! chain, extract links from the final page, offer same-host links back to
//! the frontier, and record the outcome. Per-URL failures of any kind are
//! converted into a visit outcome here; nothing a single URL does can take
//! down the worker or the crawl. Every taken URL is completed by exactly one
//! `mark_done`, which is what the frontier's drain detection relies on.

use crate::config::Config;
use crate::crawler::fetcher::is_html_content_type;
use crate::crawler::frontier::{Frontier, VisitStatus};
use crate::crawler::parser::parse_html;
use crate::crawler::redirect::{resolve, ResolveError};
use crate::url::{host_matches_root, normalize_url};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Runs one worker until the frontier closes
pub(crate) async fn run_worker(
    worker_id: usize,
    config: Arc<Config>,
    client: Client,
    frontier: Arc<Frontier>,
    root_host: String,
) {
    tracing::debug!("worker {} started", worker_id);

    while let Some(url) = frontier.take().await {
        tracing::debug!("worker {} processing {}", worker_id, url);
        let outcome = process_url(&config, &client, &frontier, &root_host, &url).await;
        frontier.mark_done(&url, outcome);
    }

    tracing::debug!("worker {} exiting", worker_id);
}

/// Processes a single URL into its visit outcome
async fn process_url(
    config: &Config,
    client: &Client,
    frontier: &Frontier,
    root_host: &str,
    url: &Url,
) -> VisitStatus {
    let page = match resolve(client, url, config.crawler.max_redirect).await {
        Ok(page) => page,
        Err(ResolveError::BudgetExceeded { chain }) => {
            tracing::warn!(
                "redirect limit reached for {} after {} hops",
                url,
                chain.hops.len()
            );
            return VisitStatus::RedirectExceeded { chain: chain.hops };
        }
        Err(e) => {
            tracing::warn!("failed to fetch {}: {}", url, e);
            return VisitStatus::Failed {
                error: e.to_string(),
            };
        }
    };

    // Only successful HTML answers are worth parsing; everything else is a
    // completed visit with an empty link set.
    if page.status != 200 || !is_html_content_type(page.content_type.as_deref()) {
        return VisitStatus::Fetched {
            status_code: page.status,
            title: None,
            links: Vec::new(),
            assets: Vec::new(),
        };
    }

    let parsed = parse_html(&page.body, &page.final_url);

    let mut links: HashSet<Url> = HashSet::with_capacity(parsed.links.len());
    for link in parsed.links {
        let normalized = match normalize_url(link.as_str()) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!("dropping unnormalizable link {}: {}", link, e);
                continue;
            }
        };

        // Root restriction is enforced here, at enqueue time: offsite links
        // are counted and discarded, never queued.
        if host_matches_root(&normalized, root_host) {
            frontier.offer(&normalized);
        } else if frontier.record_offsite(&normalized) {
            tracing::debug!("skipping offsite link {}", normalized);
        }

        links.insert(normalized);
    }

    tracing::debug!("{}: {} links discovered", url, links.len());

    VisitStatus::Fetched {
        status_code: page.status,
        title: parsed.title,
        links: links.into_iter().collect(),
        assets: parsed.assets,
    }
}
