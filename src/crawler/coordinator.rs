//! Crawl orchestration
//!
//! The discovery loop: seed the frontier, then pop → fetch → scan → merge →
//! re-seed until the queue empties or the request budget runs out. One
//! request is in flight at a time, strictly FIFO; the site has no documented
//! concurrency tolerance and the request count is already bounded, so
//! sequential fetching trades wall-clock time for politeness.
//!
//! The crawl is atomic from the caller's view: it returns a result or an
//! error, with no partial-result resumption. All state (queue, visited set,
//! merged links) is local to one invocation.

use crate::config::SiteConfig;
use crate::crawler::extractor::{ListingScanner, PromoLink};
use crate::crawler::fetcher::{fetch_task, fetch_text, FetchOutcome};
use crate::crawler::merger::LinkMerger;
use crate::crawler::queue::TaskQueue;
use crate::crawler::seeder::seed_frontier;
use crate::detail::{gather_usage, PromoUsageInfo};
use crate::{Result, SweepError};
use reqwest::Client;
use std::time::{Duration, Instant};

/// Progress sink: `(issued, pending, last_response_url)`
pub type ProgressSink<'a> = &'a mut dyn FnMut(usize, usize, &str);

/// Minimum wall-clock spacing between progress callbacks
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Bytes of the primary listing body kept in the zero-discovery diagnostic
const DIAGNOSTIC_LIMIT: usize = 500;

/// Rate-limits progress callbacks so a cooperatively-scheduled caller's UI
/// layer is not starved by hundreds of sequential requests.
struct ProgressReporter<'a> {
    sink: Option<ProgressSink<'a>>,
    last_report: Option<Instant>,
}

impl<'a> ProgressReporter<'a> {
    fn new(sink: Option<ProgressSink<'a>>) -> Self {
        Self {
            sink,
            last_report: None,
        }
    }

    fn report(&mut self, issued: usize, pending: usize, last_url: &str) {
        if let Some(sink) = self.sink.as_mut() {
            let due = self
                .last_report
                .map_or(true, |t| t.elapsed() >= PROGRESS_INTERVAL);
            if due {
                self.last_report = Some(Instant::now());
                sink(issued, pending, last_url);
            }
        }
    }

    /// Completion call, exempt from throttling
    fn finish(&mut self, issued: usize, pending: usize) {
        if let Some(sink) = self.sink.as_mut() {
            sink(issued, pending, "");
        }
    }
}

/// Discovers every reachable promo detail link for a race
///
/// Listing fetch failures are dropped silently (they are expected for the
/// speculative seed candidates); only a crawl that discovers nothing at all
/// is an error, and that error carries a diagnostic fetch of the primary
/// listing URL for operator inspection.
pub async fn collect_promo_links(
    client: &Client,
    site: &SiteConfig,
    race_id: &str,
    progress: Option<ProgressSink<'_>>,
) -> Result<Vec<PromoLink>> {
    let scanner = ListingScanner::new(site, race_id)?;
    let mut queue = TaskQueue::from_seeds(seed_frontier(site, race_id));
    let mut merger = LinkMerger::new();
    let mut reporter = ProgressReporter::new(progress);

    tracing::info!(
        "Starting discovery for race {}: {} seeds, budget {}",
        race_id,
        queue.pending(),
        queue.budget()
    );

    while let Some(task) = queue.next() {
        let (final_url, body) = match fetch_task(client, &task).await {
            FetchOutcome::Success { final_url, body } => (final_url, body),
            FetchOutcome::Dropped => continue,
        };

        let base = match url::Url::parse(&final_url) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!("Unparseable response URL {}: {}", final_url, e);
                continue;
            }
        };

        let scanned = scanner.scan(&body, &base);
        for follow_up in scanned.tasks {
            queue.push(follow_up);
        }
        for link in scanned.links {
            merger.add(link);
        }

        reporter.report(queue.issued(), queue.pending(), &final_url);
    }

    let summary = format!(
        "Discovery finished: {} links, {} requests issued, {} left in queue",
        merger.len(),
        queue.issued(),
        queue.pending()
    );
    if merger.is_empty() {
        tracing::warn!("{}", summary);
    } else {
        tracing::debug!("{}", summary);
    }

    reporter.finish(queue.issued(), queue.pending());

    if merger.is_empty() {
        return Err(zero_discovery_error(client, site, race_id).await);
    }

    Ok(merger.into_links())
}

/// Builds the zero-discovery error, fetching the primary listing URL so the
/// operator can see what the site actually served.
async fn zero_discovery_error(client: &Client, site: &SiteConfig, race_id: &str) -> SweepError {
    tracing::error!("No promo links found for race {}", race_id);
    let diagnostic = match site.listing_templates.first() {
        Some(template) => {
            let url = template.replace("{race_id}", race_id);
            match fetch_text(client, &url).await {
                Ok(body) if body.is_empty() => "<empty body>".to_string(),
                Ok(body) => {
                    let cut = body
                        .char_indices()
                        .nth(DIAGNOSTIC_LIMIT)
                        .map(|(i, _)| i)
                        .unwrap_or(body.len());
                    body[..cut].to_string()
                }
                Err(e) => format!("<diagnostic fetch failed: {}>", e),
            }
        }
        None => "<no listing templates configured>".to_string(),
    };
    tracing::error!("Diagnostic body for race {}: {}", race_id, diagnostic);
    SweepError::NoPromoLinks {
        race_id: race_id.to_string(),
        diagnostic,
    }
}

/// Full pipeline: discovery crawl followed by the detail phase
///
/// This is the crate's main entry point. The returned records are in
/// discovery order, one per unique detail URL.
pub async fn discover(
    client: &Client,
    site: &SiteConfig,
    race_id: &str,
    progress: Option<ProgressSink<'_>>,
) -> Result<Vec<PromoUsageInfo>> {
    let links = collect_promo_links(client, site, race_id, progress).await?;
    tracing::info!("Fetching {} promo detail pages", links.len());
    Ok(gather_usage(client, site, links).await)
}
