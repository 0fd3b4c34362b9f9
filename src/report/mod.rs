//! Report building and rendering
//!
//! - `groups`: filter/sort/group detail-phase records into a report
//! - `render`: console and markdown output

pub mod groups;
pub mod render;

pub use groups::{build_report, DiscountGroup, PromoReport, ReportEntry};
pub use render::{format_markdown_summary, format_report, write_markdown_summary};

use crate::crawler::fetcher::fetch_text;
use reqwest::Client;
use scraper::{Html, Selector};

/// Best-effort lookup of the race title for report headings
///
/// Reads the event page's `h1`, falling back to the document title. Any
/// failure degrades to None; the report renders with the bare race id.
pub async fn fetch_race_title(client: &Client, base_url: &str, race_id: &str) -> Option<String> {
    let url = format!("{}/events/{}", base_url.trim_end_matches('/'), race_id);
    let html = match fetch_text(client, &url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to load race page {}: {}", url, e);
            return None;
        }
    };

    let document = Html::parse_document(&html);
    for css in ["h1", "title"] {
        let selector = match Selector::parse(css) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}
