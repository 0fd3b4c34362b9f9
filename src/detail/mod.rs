//! Detail-page phase
//!
//! After discovery, every promo detail URL is fetched once as a plain GET
//! (detail pages are full pages, not partial-update fragments) and parsed
//! for a code string and a remaining-usage count. A page that fails to load
//! still yields a record: the crawl found the code, only its usage is
//! unknown, and dropping it would understate the race's inventory.

pub mod code;
pub mod usage;

pub use code::extract_code;
pub use usage::extract_usage;

use crate::config::SiteConfig;
use crate::crawler::extractor::PromoLink;
use crate::crawler::fetcher::fetch_text;
use reqwest::Client;

/// One promo code with whatever the detail page revealed about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoUsageInfo {
    /// Best-effort code text; never None after a successful detail fetch
    pub code: Option<String>,
    /// Remaining usage count, None when the page gave no parseable value
    pub usage_left: Option<i64>,
    /// Canonical detail URL, the record's identity
    pub url: String,
    /// Discount percentage carried over from the listing row
    pub discount_percent: Option<i64>,
}

/// Synthesizes a stable identifier from the detail URL
///
/// Used as the last-resort code when neither the page nor the listing
/// anchor yielded one. Falls back to the URL itself for URLs that do not
/// carry a numeric id after the detail path.
pub fn code_from_url(url: &str, detail_path: &str) -> String {
    if let Some(pos) = url.find(detail_path) {
        let digits: String = url[pos + detail_path.len()..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if !digits.is_empty() {
            return format!("promo-{}", digits);
        }
    }
    url.to_string()
}

/// Fetches every discovered detail page and extracts code/usage from each
///
/// Sequential, one request per link, in discovery order. Fetch failures
/// degrade to a record with unknown usage rather than failing the run.
pub async fn gather_usage(
    client: &Client,
    site: &SiteConfig,
    links: Vec<PromoLink>,
) -> Vec<PromoUsageInfo> {
    let mut results = Vec::with_capacity(links.len());
    for link in links {
        let html = match fetch_text(client, &link.url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to load promo page {}: {}", link.url, e);
                results.push(PromoUsageInfo {
                    code: link.anchor_text,
                    usage_left: None,
                    url: link.url,
                    discount_percent: link.discount_percent,
                });
                continue;
            }
        };
        tracing::debug!("Promo page {}: {} bytes", link.url, html.len());

        let code = extract_code(&html, site)
            .or(link.anchor_text)
            .unwrap_or_else(|| code_from_url(&link.url, &site.detail_path));
        let usage = extract_usage(&html, &site.usage_labels);
        tracing::debug!("Parsed promo code={} usage={:?} url={}", code, usage, link.url);

        results.push(PromoUsageInfo {
            code: Some(code),
            usage_left: usage,
            url: link.url,
            discount_percent: link.discount_percent,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_url_with_numeric_id() {
        assert_eq!(
            code_from_url("https://myrace.info/promo/view/123?x=1", "/promo/view/"),
            "promo-123"
        );
    }

    #[test]
    fn test_code_from_url_without_id_returns_url() {
        let url = "https://myrace.info/promo/list";
        assert_eq!(code_from_url(url, "/promo/view/"), url);
    }
}
