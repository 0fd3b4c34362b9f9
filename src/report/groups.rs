//! Report assembly: filtering, ordering, grouping, totals
//!
//! Exhausted codes (zero remaining usage) are dropped. Survivors are
//! ordered by remaining usage descending with unknown usage last, ties
//! broken by code text ascending case-insensitively, then grouped by
//! discount percentage: highest discount first, unknown-discount bucket at
//! the end. Each group and the report as a whole carry summary totals.

use crate::detail::{code_from_url, PromoUsageInfo};

/// One reportable promo code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Display code, never empty (falls back to a URL-derived identifier)
    pub code: String,
    pub url: String,
    pub usage_left: Option<i64>,
}

/// All codes sharing one discount percentage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountGroup {
    /// None is the explicit unknown-discount bucket
    pub discount_percent: Option<i64>,
    pub entries: Vec<ReportEntry>,
    /// Sum of the known usage values in this group
    pub known_usage: i64,
    /// Entries whose usage could not be determined
    pub unknown_count: usize,
}

impl DiscountGroup {
    pub fn code_count(&self) -> usize {
        self.entries.len()
    }
}

/// Grouped, ordered report over one race's promo codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoReport {
    pub groups: Vec<DiscountGroup>,
    pub total_codes: usize,
    pub total_known_usage: i64,
    pub total_unknown: usize,
}

impl PromoReport {
    /// True when every discovered code was exhausted (or nothing survived
    /// filtering)
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Builds the report from raw detail-phase records
pub fn build_report(promos: Vec<PromoUsageInfo>, detail_path: &str) -> PromoReport {
    let exhausted = promos
        .iter()
        .filter(|p| p.usage_left == Some(0))
        .count();
    if exhausted > 0 {
        tracing::debug!("Filtered out {} exhausted codes", exhausted);
    }

    let mut active: Vec<(String, PromoUsageInfo)> = promos
        .into_iter()
        .filter(|p| p.usage_left != Some(0))
        .map(|p| {
            let code = p
                .code
                .clone()
                .unwrap_or_else(|| code_from_url(&p.url, detail_path))
                .trim()
                .to_string();
            (code, p)
        })
        .collect();

    active.sort_by(|(code_a, a), (code_b, b)| {
        let usage_a = a.usage_left.unwrap_or(-1);
        let usage_b = b.usage_left.unwrap_or(-1);
        usage_b
            .cmp(&usage_a)
            .then_with(|| code_a.to_lowercase().cmp(&code_b.to_lowercase()))
    });

    // Stable grouping: entries keep their sorted order inside each group
    let mut buckets: Vec<(Option<i64>, Vec<ReportEntry>)> = Vec::new();
    for (code, info) in active {
        let entry = ReportEntry {
            code,
            url: info.url,
            usage_left: info.usage_left,
        };
        match buckets
            .iter_mut()
            .find(|(discount, _)| *discount == info.discount_percent)
        {
            Some((_, entries)) => entries.push(entry),
            None => buckets.push((info.discount_percent, vec![entry])),
        }
    }

    buckets.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let groups: Vec<DiscountGroup> = buckets
        .into_iter()
        .map(|(discount_percent, entries)| {
            let known_usage = entries.iter().filter_map(|e| e.usage_left).sum();
            let unknown_count = entries.iter().filter(|e| e.usage_left.is_none()).count();
            DiscountGroup {
                discount_percent,
                entries,
                known_usage,
                unknown_count,
            }
        })
        .collect();

    PromoReport {
        total_codes: groups.iter().map(DiscountGroup::code_count).sum(),
        total_known_usage: groups.iter().map(|g| g.known_usage).sum(),
        total_unknown: groups.iter().map(|g| g.unknown_count).sum(),
        groups,
    }
}
