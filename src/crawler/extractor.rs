//! Listing-page link and directive extraction
//!
//! Pure function over fetched HTML plus its resolved response URL: no
//! network access, so every discovery rule is testable against fixed
//! fixtures. A scan yields two things: promo detail-page discoveries, and
//! follow-up tasks (pagination the seed list did not anticipate, plus
//! progressive-enhancement directives that imply additional requests).
//!
//! The site renders listings in several shapes, some of which only mention
//! detail URLs inside inline script/JSON fragments, so the DOM pass is
//! backed by regex scans over the raw body (and over the body with the one
//! common `\/` escape undone).

use crate::config::SiteConfig;
use crate::crawler::task::Task;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One discovery of a promo detail page
///
/// Multiple discoveries of the same URL may arrive through different paths
/// during a crawl; the merger folds them together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoLink {
    pub url: String,
    pub anchor_text: Option<String>,
    pub discount_percent: Option<i64>,
}

/// Output of scanning one listing response
#[derive(Debug, Default)]
pub struct ScanResult {
    pub links: Vec<PromoLink>,
    pub tasks: Vec<Task>,
}

/// Parses the first integer found in a text fragment
///
/// Tolerates non-breaking spaces and surrounding prose; used for discount
/// cells on listings and usage values on detail pages.
pub fn extract_first_int(text: &str) -> Option<i64> {
    let cleaned = text.replace('\u{a0}', " ");
    let bytes = cleaned.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map(|p| start + p)
        .unwrap_or(bytes.len());
    let value: i64 = cleaned[start..end].parse().ok()?;
    if start > 0 && bytes[start - 1] == b'-' {
        Some(-value)
    } else {
        Some(value)
    }
}

/// Compiled scan rules for one crawl
pub struct ListingScanner {
    detail_path: String,
    listing_path_segment: String,
    race_segment: String,
    detail_re: Regex,
    view_url_double_re: Regex,
    view_url_single_re: Regex,
    view_url_assign_re: Regex,
}

impl ListingScanner {
    pub fn new(site: &SiteConfig, race_id: &str) -> Result<Self, regex::Error> {
        Ok(ListingScanner {
            detail_path: site.detail_path.clone(),
            listing_path_segment: site.listing_path_segment.clone(),
            race_segment: format!("/races/{}", race_id),
            detail_re: Regex::new(&format!(
                r#"{}\d+(?:\?[^\s"'>]*)?"#,
                regex::escape(&site.detail_path)
            ))?,
            view_url_double_re: Regex::new(r#""(?:viewUrl|view_url)"\s*:\s*"([^"]+)""#)?,
            view_url_single_re: Regex::new(r"'(?:viewUrl|view_url)'\s*:\s*'([^']+)'")?,
            view_url_assign_re: Regex::new(r#"promoViewUrl\s*=\s*['"]([^'"]+)['"]"#)?,
        })
    }

    /// Scans one fetched body, full page or fragment alike
    pub fn scan(&self, body: &str, base: &Url) -> ScanResult {
        let mut found: Vec<PromoLink> = Vec::new();
        let mut tasks: Vec<Task> = Vec::new();

        let unescaped = body.replace("\\/", "/");
        let document = Html::parse_document(body);

        self.scan_anchors(&document, base, &mut found, &mut tasks);
        self.scan_data_attributes(&document, base, &mut found);
        self.scan_raw_text(body, &unescaped, base, &mut found);
        self.scan_directives(&document, base, &mut tasks);

        // A discovery only counts if it belongs to this race or is a detail
        // page; fragments sometimes link out to unrelated site chrome.
        found.retain(|link| {
            link.url.contains(&self.race_segment) || link.url.contains(&self.detail_path)
        });

        ScanResult {
            links: found,
            tasks,
        }
    }

    /// Anchors: detail links, and pagination/filter links to re-seed
    fn scan_anchors(
        &self,
        document: &Html,
        base: &Url,
        found: &mut Vec<PromoLink>,
        tasks: &mut Vec<Task>,
    ) {
        let selector = match Selector::parse("a[href]") {
            Ok(s) => s,
            Err(_) => return,
        };
        for element in document.select(&selector) {
            let href = match element.value().attr("href") {
                Some(h) => h,
                None => continue,
            };

            if !href.contains(&self.detail_path) {
                // Listing pages report their own pagination and filter
                // links; follow the ones belonging to this race.
                if (href.contains("page=") || href.contains("type="))
                    && href.contains(&self.listing_path_segment)
                {
                    if let Ok(page_url) = base.join(href) {
                        let page_url = page_url.to_string();
                        if page_url.contains(&self.race_segment) {
                            tracing::debug!("Discovered pagination link {}", page_url);
                            tasks.push(Task::get(page_url));
                        }
                    }
                }
                continue;
            }

            let full = match base.join(href) {
                Ok(u) => u.to_string(),
                Err(_) => continue,
            };
            found.push(PromoLink {
                url: full,
                anchor_text: element_text(&element),
                discount_percent: discount_from_row(&element),
            });
        }
    }

    /// Elements addressing detail pages through data-* attributes
    fn scan_data_attributes(&self, document: &Html, base: &Url, found: &mut Vec<PromoLink>) {
        for attr in ["data-url", "data-href", "data-action"] {
            let selector = match Selector::parse(&format!("[{}]", attr)) {
                Ok(s) => s,
                Err(_) => continue,
            };
            for element in document.select(&selector) {
                let value = match element.value().attr(attr) {
                    Some(v) => v,
                    None => continue,
                };
                if !value.contains(&self.detail_path) {
                    continue;
                }
                let cleaned = value.replace("\\/", "/");
                if let Ok(full) = base.join(&cleaned) {
                    found.push(PromoLink {
                        url: full.to_string(),
                        anchor_text: element_text(&element),
                        discount_percent: None,
                    });
                }
            }
        }
    }

    /// Regex scans for detail URLs the DOM pass cannot see
    fn scan_raw_text(&self, body: &str, unescaped: &str, base: &Url, found: &mut Vec<PromoLink>) {
        for source in [body, unescaped] {
            for m in self.detail_re.find_iter(source) {
                if let Ok(full) = base.join(m.as_str()) {
                    found.push(PromoLink {
                        url: full.to_string(),
                        anchor_text: None,
                        discount_percent: None,
                    });
                }
            }
            for re in [&self.view_url_double_re, &self.view_url_single_re] {
                for caps in re.captures_iter(source) {
                    let href = &caps[1];
                    if !href.contains(&self.detail_path) {
                        continue;
                    }
                    if let Ok(full) = base.join(href) {
                        found.push(PromoLink {
                            url: full.to_string(),
                            anchor_text: None,
                            discount_percent: None,
                        });
                    }
                }
            }
        }

        for caps in self.view_url_assign_re.captures_iter(unescaped) {
            let href = &caps[1];
            if !href.contains(&self.detail_path) {
                continue;
            }
            if let Ok(full) = base.join(href) {
                found.push(PromoLink {
                    url: full.to_string(),
                    anchor_text: None,
                    discount_percent: None,
                });
            }
        }
    }

    /// Progressive-enhancement directives implying further requests
    ///
    /// A POST directive bound to a form synthesizes the payload the live
    /// page would send, from the form's current field state, without
    /// executing any page scripting.
    fn scan_directives(&self, document: &Html, base: &Url, tasks: &mut Vec<Task>) {
        for attr in ["hx-get", "hx-post", "data-hx-get", "data-hx-post"] {
            let selector = match Selector::parse(&format!("[{}]", attr)) {
                Ok(s) => s,
                Err(_) => continue,
            };
            let is_post = attr.ends_with("post");
            for element in document.select(&selector) {
                let raw = match element.value().attr(attr) {
                    Some(v) => v,
                    None => continue,
                };
                let cleaned = raw.replace("\\/", "/");
                let target = match base.join(&cleaned) {
                    Ok(u) => u.to_string(),
                    Err(_) => continue,
                };
                if !target.contains(&self.race_segment)
                    && !target.contains(&self.listing_path_segment)
                    && !target.contains(&self.detail_path)
                {
                    continue;
                }

                let task = if is_post {
                    let payload = if element.value().name() == "form" {
                        synthesize_form_payload(&element)
                    } else {
                        Vec::new()
                    };
                    tracing::debug!(
                        "Directive POST {} with {} fields",
                        target,
                        payload.len()
                    );
                    Task::post(target, payload)
                } else {
                    tracing::debug!("Directive GET {}", target);
                    Task::get(target)
                };
                tasks.push(task);
            }
        }
    }
}

/// Trimmed text content of an element, or None when empty
fn element_text(element: &ElementRef) -> Option<String> {
    let text: String = element.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Reads the discount percentage from the anchor's parent table row
///
/// The listing table keeps the discount in the third cell; rows with fewer
/// cells contribute nothing.
fn discount_from_row(element: &ElementRef) -> Option<i64> {
    let row = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "tr")?;
    let cells: Vec<ElementRef> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "td")
        .collect();
    if cells.len() < 3 {
        return None;
    }
    let text: String = cells[2].text().collect::<String>().trim().to_string();
    extract_first_int(&text)
}

/// Builds the key/value pairs a browser would submit for this form
fn synthesize_form_payload(form: &ElementRef) -> Vec<(String, String)> {
    let mut payload: Vec<(String, String)> = Vec::new();

    if let Ok(input_selector) = Selector::parse("input[name]") {
        for input in form.select(&input_selector) {
            let name = match input.value().attr("name") {
                Some(n) => n.to_string(),
                None => continue,
            };
            let input_type = input
                .value()
                .attr("type")
                .unwrap_or("text")
                .to_ascii_lowercase();
            if matches!(input_type.as_str(), "checkbox" | "radio")
                && input.value().attr("checked").is_none()
            {
                continue;
            }
            let value = input.value().attr("value").unwrap_or("").to_string();
            payload.push((name, value));
        }
    }

    if let Ok(select_selector) = Selector::parse("select[name]") {
        let option_selector = Selector::parse("option").ok();
        for select in form.select(&select_selector) {
            let name = match select.value().attr("name") {
                Some(n) => n.to_string(),
                None => continue,
            };
            let Some(option_selector) = option_selector.as_ref() else {
                continue;
            };
            let options: Vec<ElementRef> = select.select(option_selector).collect();
            let chosen = options
                .iter()
                .find(|o| o.value().attr("selected").is_some())
                .or_else(|| options.first());
            if let Some(option) = chosen {
                let value = option
                    .value()
                    .attr("value")
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| option.text().collect::<String>().trim().to_string());
                payload.push((name, value));
            }
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::task::Method;

    fn scanner() -> ListingScanner {
        ListingScanner::new(&SiteConfig::default(), "1440").unwrap()
    }

    fn base() -> Url {
        Url::parse("https://myrace.info/promo/races/1440/slots").unwrap()
    }

    #[test]
    fn test_extract_first_int() {
        assert_eq!(extract_first_int("осталось 15 мест"), Some(15));
        assert_eq!(extract_first_int("50%"), Some(50));
        assert_eq!(extract_first_int("\u{a0}7"), Some(7));
        assert_eq!(extract_first_int("none"), None);
        assert_eq!(extract_first_int(""), None);
    }

    #[test]
    fn test_anchor_detail_link_with_discount() {
        let html = r#"
            <table><tr>
                <td><a href="/promo/view/101">SPRING-10</a></td>
                <td>active</td>
                <td>30%</td>
            </tr></table>
        "#;
        let result = scanner().scan(html, &base());
        assert_eq!(result.links.len(), 1);
        let link = &result.links[0];
        assert_eq!(link.url, "https://myrace.info/promo/view/101");
        assert_eq!(link.anchor_text.as_deref(), Some("SPRING-10"));
        assert_eq!(link.discount_percent, Some(30));
    }

    #[test]
    fn test_row_without_third_cell_has_no_discount() {
        let html = r#"<table><tr><td><a href="/promo/view/5">X-CODE</a></td></tr></table>"#;
        let result = scanner().scan(html, &base());
        assert_eq!(result.links[0].discount_percent, None);
    }

    #[test]
    fn test_pagination_link_becomes_task() {
        let html = r#"<a href="/promo/races/1440/slots?page=3">Next</a>"#;
        let result = scanner().scan(html, &base());
        assert!(result.links.is_empty());
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].method, Method::Get);
        assert_eq!(
            result.tasks[0].url,
            "https://myrace.info/promo/races/1440/slots?page=3"
        );
    }

    #[test]
    fn test_other_race_pagination_ignored() {
        let html = r#"<a href="/promo/races/9999/slots?page=2">Other race</a>"#;
        let result = scanner().scan(html, &base());
        assert!(result.tasks.is_empty());
    }

    #[test]
    fn test_data_attribute_discovery() {
        let html = r#"<button data-url="/promo/view/77">Show</button>"#;
        let result = scanner().scan(html, &base());
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].url, "https://myrace.info/promo/view/77");
        assert_eq!(result.links[0].anchor_text.as_deref(), Some("Show"));
        assert_eq!(result.links[0].discount_percent, None);
    }

    #[test]
    fn test_raw_json_view_url() {
        let html = r#"<script>var rows = [{"viewUrl": "\/promo\/view\/42"}];</script>"#;
        let result = scanner().scan(html, &base());
        assert!(result
            .links
            .iter()
            .any(|l| l.url == "https://myrace.info/promo/view/42"));
    }

    #[test]
    fn test_raw_single_quoted_view_url() {
        let html = r#"<script>load({'view_url': '/promo/view/43'});</script>"#;
        let result = scanner().scan(html, &base());
        assert!(result
            .links
            .iter()
            .any(|l| l.url == "https://myrace.info/promo/view/43"));
    }

    #[test]
    fn test_promo_view_url_assignment() {
        let html = r#"<script>var promoViewUrl = '/promo/view/44?src=list';</script>"#;
        let result = scanner().scan(html, &base());
        assert!(result
            .links
            .iter()
            .any(|l| l.url == "https://myrace.info/promo/view/44?src=list"));
    }

    #[test]
    fn test_bare_path_in_script() {
        let html = r#"<script>open("/promo/view/45?x=1")</script>"#;
        let result = scanner().scan(html, &base());
        assert!(result
            .links
            .iter()
            .any(|l| l.url == "https://myrace.info/promo/view/45?x=1"));
    }

    #[test]
    fn test_hx_get_directive() {
        let html = r#"<div hx-get="/races/1440/coupons/items/">lazy list</div>"#;
        let result = scanner().scan(html, &base());
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].method, Method::Get);
        assert_eq!(
            result.tasks[0].url,
            "https://myrace.info/races/1440/coupons/items/"
        );
    }

    #[test]
    fn test_hx_post_form_payload_synthesis() {
        let html = r#"
            <form hx-post="/races/1440/coupons/items/">
                <input name="page" value="2">
                <input type="checkbox" name="archived" value="1">
                <input type="checkbox" name="active" value="1" checked>
                <input type="hidden" name="token" value="t0k">
                <select name="sort">
                    <option value="date">Date</option>
                    <option value="code" selected>Code</option>
                </select>
            </form>
        "#;
        let result = scanner().scan(html, &base());
        assert_eq!(result.tasks.len(), 1);
        let task = &result.tasks[0];
        assert_eq!(task.method, Method::Post);
        let payload = task.payload.as_ref().unwrap();
        let pairs = payload.pairs();
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("active".to_string(), "1".to_string())));
        assert!(pairs.contains(&("token".to_string(), "t0k".to_string())));
        assert!(pairs.contains(&("sort".to_string(), "code".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "archived"));
    }

    #[test]
    fn test_select_defaults_to_first_option() {
        let html = r#"
            <form hx-post="/races/1440/coupons/items/">
                <select name="status">
                    <option value="all">All</option>
                    <option value="used">Used</option>
                </select>
            </form>
        "#;
        let result = scanner().scan(html, &base());
        let payload = result.tasks[0].payload.as_ref().unwrap();
        assert_eq!(payload.pairs(), [("status".to_string(), "all".to_string())]);
    }

    #[test]
    fn test_unrelated_directive_ignored() {
        let html = r#"<div hx-get="/notifications/poll">bell</div>"#;
        let result = scanner().scan(html, &base());
        assert!(result.tasks.is_empty());
    }

    #[test]
    fn test_unrelated_links_filtered_out() {
        let html = r#"<a href="/events/1440">Event page</a>"#;
        let result = scanner().scan(html, &base());
        assert!(result.links.is_empty());
        assert!(result.tasks.is_empty());
    }

    #[test]
    fn test_fragment_response_scans_like_full_page() {
        // Partial-update responses are bare fragments with no html/body shell
        let html = r#"<tr><td><a href="/promo/view/9">FRAG-CODE</a></td></tr>"#;
        let result = scanner().scan(html, &base());
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].anchor_text.as_deref(), Some("FRAG-CODE"));
    }
}
