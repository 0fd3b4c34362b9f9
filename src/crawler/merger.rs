//! Merging of promo-link discoveries
//!
//! The same detail page is typically discovered through several paths (the
//! live listing, a filter variant, a raw-text scan), each carrying a
//! different slice of metadata. Discoveries are folded into a map keyed by
//! URL: first non-null anchor text and discount win, later discoveries never
//! overwrite a known value. Insertion order is preserved so the detail phase
//! and the report iterate deterministically.

use crate::crawler::extractor::PromoLink;
use std::collections::HashMap;

#[derive(Default)]
pub struct LinkMerger {
    order: Vec<String>,
    by_url: HashMap<String, PromoLink>,
}

impl LinkMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one discovery into the merged set
    pub fn add(&mut self, link: PromoLink) {
        match self.by_url.get_mut(&link.url) {
            None => {
                tracing::debug!("New promo link {} ({:?})", link.url, link.anchor_text);
                self.order.push(link.url.clone());
                self.by_url.insert(link.url.clone(), link);
            }
            Some(existing) => {
                if existing.anchor_text.is_none() {
                    existing.anchor_text = link.anchor_text;
                }
                if existing.discount_percent.is_none() {
                    existing.discount_percent = link.discount_percent;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Merged links in discovery order
    pub fn into_links(mut self) -> Vec<PromoLink> {
        self.order
            .iter()
            .filter_map(|url| self.by_url.remove(url))
            .collect()
    }
}
