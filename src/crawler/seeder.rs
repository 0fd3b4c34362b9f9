//! Frontier seeding
//!
//! Expands a race identifier into the initial candidate requests. The
//! target site has changed its listing path over time and the live variant
//! for a given deployment is unknown in advance, so seeding deliberately
//! over-generates: every template, every pagination step, every type/status
//! filter combination. Dead candidates cost one dropped request each; the
//! visited set absorbs the overlap.

use crate::config::SiteConfig;
use crate::crawler::task::Task;
use std::collections::HashSet;

/// Appends a query parameter with the correct separator
fn with_query(url: &str, param: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, param)
}

/// Enqueues the bare URL plus its `page=1..N` variants
fn enqueue_with_pages(tasks: &mut Vec<Task>, url: &str, max_pages: u32) {
    tasks.push(Task::get(url));
    for page in 1..=max_pages {
        tasks.push(Task::get(with_query(url, &format!("page={}", page))));
    }
}

/// Expands the race identifier into the initial task list
///
/// Seed order matters: bare template URLs come first so the live listing is
/// usually hit within the first few requests, then pagination, then the
/// filter cross product. The request budget is derived from the returned
/// length, counted before any visited-set deduplication.
pub fn seed_frontier(site: &SiteConfig, race_id: &str) -> Vec<Task> {
    let mut tasks = Vec::new();
    let mut listing_urls = Vec::new();

    for template in &site.listing_templates {
        let base = template.replace("{race_id}", race_id);
        enqueue_with_pages(&mut tasks, &base, site.max_pages);

        // The progressive-enhancement listing also serves dedicated paged
        // POST endpoints, one path-paged and one form-paged.
        if base.contains(&site.coupons_segment) {
            for page in 1..=site.max_pages {
                let url = site
                    .paged_post_template
                    .replace("{race_id}", race_id)
                    .replace("{page}", &page.to_string());
                tasks.push(Task::post(url, vec![]));
            }
            let items_url = site.items_post_template.replace("{race_id}", race_id);
            for page in 1..=site.max_pages {
                tasks.push(Task::post(
                    items_url.clone(),
                    vec![("page".to_string(), page.to_string())],
                ));
            }
        }

        listing_urls.push(base);
    }

    // Type/status filter cross product over every listing variant.
    let mut seen_variants = HashSet::new();
    for slug in &site.type_slugs {
        for base in &listing_urls {
            let typed = with_query(base, &format!("type={}", slug));
            let mut variants = vec![typed.clone()];
            for status in &site.status_filters {
                variants.push(with_query(&typed, &format!("status={}", status)));
            }
            for variant in variants {
                if seen_variants.insert(variant.clone()) {
                    enqueue_with_pages(&mut tasks, &variant, site.max_pages);
                }
            }
        }
    }

    tracing::debug!(
        "Seeded {} candidate requests for race {}",
        tasks.len(),
        race_id
    );
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::task::Method;

    fn small_site() -> SiteConfig {
        SiteConfig {
            listing_templates: vec![
                "https://myrace.info/promo/races/{race_id}".to_string(),
                "https://myrace.info/races/{race_id}/coupons/".to_string(),
            ],
            type_slugs: vec!["distance".to_string()],
            status_filters: vec!["all".to_string()],
            max_pages: 2,
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_race_id_substitution() {
        let tasks = seed_frontier(&small_site(), "77");
        assert!(tasks
            .iter()
            .all(|t| t.url.contains("/77") || t.url.contains("/77/")));
        assert_eq!(tasks[0].url, "https://myrace.info/promo/races/77");
    }

    #[test]
    fn test_page_variants_enqueued() {
        let tasks = seed_frontier(&small_site(), "77");
        assert!(tasks
            .iter()
            .any(|t| t.url == "https://myrace.info/promo/races/77?page=2"));
    }

    #[test]
    fn test_coupons_template_adds_post_endpoints() {
        let tasks = seed_frontier(&small_site(), "77");
        let posts: Vec<_> = tasks.iter().filter(|t| t.method == Method::Post).collect();
        // 2 pages path-paged + 2 pages form-paged
        assert_eq!(posts.len(), 4);
        assert!(posts
            .iter()
            .any(|t| t.url == "https://myrace.info/races/77/coupons/pages/2/"));
        assert!(posts.iter().any(|t| {
            t.url == "https://myrace.info/races/77/coupons/items/"
                && t.payload
                    .as_ref()
                    .is_some_and(|p| p.pairs() == [("page".to_string(), "1".to_string())])
        }));
    }

    #[test]
    fn test_filter_cross_product() {
        let tasks = seed_frontier(&small_site(), "77");
        assert!(tasks
            .iter()
            .any(|t| t.url == "https://myrace.info/promo/races/77?type=distance"));
        assert!(tasks
            .iter()
            .any(|t| t.url == "https://myrace.info/promo/races/77?type=distance&status=all"));
        // Variant with an existing query string keeps using '&'
        assert!(tasks
            .iter()
            .any(|t| t.url == "https://myrace.info/promo/races/77?type=distance&page=1"));
    }

    #[test]
    fn test_no_duplicate_filter_variants() {
        let mut site = small_site();
        site.type_slugs = vec!["distance".to_string(), "distance".to_string()];
        let tasks = seed_frontier(&site, "77");
        let typed: Vec<_> = tasks
            .iter()
            .filter(|t| t.url == "https://myrace.info/promo/races/77?type=distance")
            .collect();
        assert_eq!(typed.len(), 1);
    }
}
