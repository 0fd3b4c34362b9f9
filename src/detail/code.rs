//! Code extraction from a promo detail page
//!
//! The site has rendered the code in at least three layouts over time: an
//! editable input field, a highlighted table cell linking back to the detail
//! page, and a bare text node. The heuristics run in order of specificity
//! and the first hit wins. The site brand sometimes appears styled exactly
//! like a code, so it is excluded everywhere by name.

use crate::config::SiteConfig;
use scraper::{Html, Selector};

/// Extracts the promo code from detail-page HTML, most specific rule first
pub fn extract_code(html: &str, site: &SiteConfig) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(value) = code_from_input(&document) {
        return Some(value);
    }
    if let Some(value) = code_from_table_anchor(&document, site) {
        return Some(value);
    }
    code_from_text_node(&document, site)
}

/// The editable layout keeps the code as the value of a `code` input
fn code_from_input(document: &Html) -> Option<String> {
    for css in ["input#code", "input[name='code']"] {
        let selector = match Selector::parse(css) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(field) = document.select(&selector).next() {
            let value = field.value().attr("value").unwrap_or("").trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// The tabular layout links the code text back to its own detail page
fn code_from_table_anchor(document: &Html, site: &SiteConfig) -> Option<String> {
    let css = format!(
        "table.items td.text-strong a[href*='{}']",
        site.detail_path
    );
    let selector = Selector::parse(&css).ok()?;
    let anchor = document.select(&selector).next()?;
    let text: String = anchor.text().collect::<String>().trim().to_string();
    if text.is_empty() || text.to_uppercase() == site.brand_placeholder {
        return None;
    }
    Some(text)
}

/// Last resort: the first text node shaped like a code
fn code_from_text_node(document: &Html, site: &SiteConfig) -> Option<String> {
    document
        .tree
        .nodes()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .find(|text| looks_like_code(text) && text.to_uppercase() != site.brand_placeholder)
        .map(String::from)
}

/// Uppercase alphanumerics and dashes, 4 to 16 characters
fn looks_like_code(text: &str) -> bool {
    (4..=16).contains(&text.len())
        && text
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
}
