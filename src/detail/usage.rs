//! Remaining-usage extraction from a promo detail page
//!
//! The usage count sits next to a known label ("Maximum number of uses" and
//! its Russian variants) but the surrounding markup varies: a table row, a
//! definition list, loose inline siblings, or prose. For each label found in
//! the page, the placement strategies run from most to least structured; the
//! first strategy producing a parseable integer wins.

use crate::crawler::extractor::extract_first_int;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};

/// One way the value can be placed relative to the label's element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageStrategy {
    /// Last cell of the table row containing the label
    CellSibling,
    /// The label's element is a `dt`; the value is the following `dd`
    DefinitionList,
    /// The label is nested inside a `dt`; the value is its following `dd`
    AncestorDefinitionList,
    /// Scan the label element's following siblings for a number
    NextSiblingScan,
    /// Nearest digit-bearing text node after the label element
    NearestDigit,
}

/// Strategies in resolution order, most structured first
pub const STRATEGY_ORDER: [UsageStrategy; 5] = [
    UsageStrategy::CellSibling,
    UsageStrategy::DefinitionList,
    UsageStrategy::AncestorDefinitionList,
    UsageStrategy::NextSiblingScan,
    UsageStrategy::NearestDigit,
];

impl UsageStrategy {
    fn resolve(self, document: &Html, element: NodeRef<Node>) -> Option<i64> {
        match self {
            UsageStrategy::CellSibling => {
                let row = element
                    .ancestors()
                    .find(|n| element_name(n) == Some("tr"))?;
                let cells: Vec<ElementRef> = row
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| matches!(e.value().name(), "td" | "th" | "dd"))
                    .collect();
                if cells.len() < 2 {
                    return None;
                }
                extract_first_int(&element_text(*cells.last()?))
            }
            UsageStrategy::DefinitionList => {
                if element_name(&element) != Some("dt") {
                    return None;
                }
                let dd = following_sibling_dd(element)?;
                extract_first_int(&element_text(dd))
            }
            UsageStrategy::AncestorDefinitionList => {
                let dt = element
                    .ancestors()
                    .find(|n| element_name(n) == Some("dt"))?;
                let dd = following_sibling_dd(dt)?;
                extract_first_int(&element_text(dd))
            }
            UsageStrategy::NextSiblingScan => element
                .next_siblings()
                .map(node_text)
                .filter(|text| !text.is_empty())
                .find_map(|text| extract_first_int(&text)),
            UsageStrategy::NearestDigit => {
                let mut past_element = false;
                for node in document.root_element().descendants() {
                    if node.id() == element.id() {
                        past_element = true;
                        continue;
                    }
                    if !past_element {
                        continue;
                    }
                    if let Some(text) = node.value().as_text() {
                        if text.chars().any(|c| c.is_ascii_digit()) {
                            return extract_first_int(text);
                        }
                    }
                }
                None
            }
        }
    }
}

/// Extracts the remaining-usage count, trying each label variant in order
pub fn extract_usage(html: &str, labels: &[String]) -> Option<i64> {
    let document = Html::parse_document(html);

    for label in labels {
        let needle = label.to_lowercase();
        let Some(label_node) = find_label_node(&document, &needle) else {
            continue;
        };
        let Some(element) = label_node.parent().filter(|n| n.value().is_element()) else {
            continue;
        };

        for strategy in STRATEGY_ORDER {
            if let Some(value) = strategy.resolve(&document, element) {
                tracing::debug!("Usage {} resolved via {:?}", value, strategy);
                return Some(value);
            }
        }
    }
    None
}

/// First text node containing the (lowercased) label, document order
fn find_label_node<'a>(document: &'a Html, needle: &str) -> Option<NodeRef<'a, Node>> {
    document.root_element().descendants().find(|node| {
        node.value()
            .as_text()
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

fn element_name<'a>(node: &NodeRef<'a, Node>) -> Option<&'a str> {
    node.value().as_element().map(|e| e.name())
}

/// Text content of an element, space-joined across nested nodes
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of an arbitrary sibling node: the node itself if text, its content
/// if an element
fn node_text(node: NodeRef<Node>) -> String {
    if let Some(text) = node.value().as_text() {
        text.trim().to_string()
    } else if let Some(element) = ElementRef::wrap(node) {
        element_text(element)
    } else {
        String::new()
    }
}

/// First `dd` among the node's following siblings
fn following_sibling_dd(node: NodeRef<Node>) -> Option<ElementRef> {
    node.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "dd")
}
