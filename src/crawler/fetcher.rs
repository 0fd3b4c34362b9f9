//! HTTP fetching for crawl tasks
//!
//! One request per task, no retries. Listing requests carry headers marking
//! them as progressive partial-update fetches, so a server behaving like the
//! reference site returns a fragment instead of a full page; the extractor
//! treats fragments and full pages identically. Failures are dropped with a
//! debug-level log entry: a failed task is almost always a speculative
//! seeded URL that this deployment never served, not a transient fault.

use crate::crawler::task::{Method, Task};
use reqwest::Client;

/// Header set marking a request as a partial-update fetch
pub const PARTIAL_UPDATE_HEADERS: [(&str, &str); 2] = [
    ("HX-Request", "true"),
    ("X-Requested-With", "XMLHttpRequest"),
];

/// Result of issuing one crawl task
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response with a body
    Success {
        /// Final URL after redirects, used as the base for link resolution
        final_url: String,
        body: String,
    },

    /// Transport failure or non-2xx status; the task is not retried
    Dropped,
}

/// Issues the HTTP request for one task
pub async fn fetch_task(client: &Client, task: &Task) -> FetchOutcome {
    let mut request = match task.method {
        Method::Get => client.get(&task.url),
        Method::Post => {
            let pairs: &[(String, String)] = task
                .payload
                .as_ref()
                .map(|p| p.pairs())
                .unwrap_or_default();
            client.post(&task.url).form(pairs)
        }
    };
    for (name, value) in PARTIAL_UPDATE_HEADERS {
        request = request.header(name, value);
    }

    let response = match request.send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Dropping {} {}: {}", task.method, task.url, e);
            return FetchOutcome::Dropped;
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::debug!("Dropping {} {}: HTTP {}", task.method, task.url, status);
        return FetchOutcome::Dropped;
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => {
            tracing::debug!(
                "Fetched {} {}: {} bytes from {}",
                task.method,
                task.url,
                body.len(),
                final_url
            );
            FetchOutcome::Success { final_url, body }
        }
        Err(e) => {
            tracing::debug!("Dropping {} {}: body read failed: {}", task.method, task.url, e);
            FetchOutcome::Dropped
        }
    }
}

/// Plain GET returning the body, for detail pages and diagnostics
///
/// Detail pages are full pages, so this carries no partial-update headers.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    response.text().await
}
