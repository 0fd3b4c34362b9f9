use serde::Deserialize;

/// Main configuration structure for Promo-Sweep
///
/// Every section has defaults reproducing the reference deployment, so an
/// empty config file is valid and each crawl can be handed an independent
/// `Config` value (nothing is read from process-wide state).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Site knowledge: where promo listings and detail pages live
///
/// The target site has moved its listing path over time, so the template
/// list carries the canonical path plus historical alternates; the seeder
/// tries all of them and lets the visited set absorb the redundancy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the site, without a trailing slash
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Default race identifier used when the CLI supplies none
    #[serde(rename = "default-race-id")]
    pub default_race_id: String,

    /// Listing URL templates, `{race_id}` substituted at seed time
    #[serde(rename = "listing-templates")]
    pub listing_templates: Vec<String>,

    /// Path segment identifying a promo detail page
    #[serde(rename = "detail-path")]
    pub detail_path: String,

    /// Path segment identifying listing pages whose pagination links are followed
    #[serde(rename = "listing-path-segment")]
    pub listing_path_segment: String,

    /// Path segment marking the progressive-enhancement listing variant
    #[serde(rename = "coupons-segment")]
    pub coupons_segment: String,

    /// POST endpoint template with the page number in the path
    #[serde(rename = "paged-post-template")]
    pub paged_post_template: String,

    /// POST endpoint template taking the page number as a form field
    #[serde(rename = "items-post-template")]
    pub items_post_template: String,

    /// Known code-type classifier values for the `type=` filter
    #[serde(rename = "type-slugs")]
    pub type_slugs: Vec<String>,

    /// Known values for the `status=` filter
    #[serde(rename = "status-filters")]
    pub status_filters: Vec<String>,

    /// Pagination cap per listing variant
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Site-brand string that must never be mistaken for a promo code
    #[serde(rename = "brand-placeholder")]
    pub brand_placeholder: String,

    /// Label variants preceding the remaining-usage value on detail pages
    ///
    /// The site has shipped both Russian and English phrasings.
    #[serde(rename = "usage-labels")]
    pub usage_labels: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://myrace.info".to_string(),
            default_race_id: "1440".to_string(),
            listing_templates: vec![
                "https://myrace.info/promo/races/{race_id}/slots".to_string(),
                "https://myrace.info/promo/races/{race_id}".to_string(),
                "https://myrace.info/race/coupons/list/{race_id}".to_string(),
                "https://myrace.info/races/{race_id}/coupons/".to_string(),
                "https://myrace.info/races/{race_id}/coupons/items/".to_string(),
            ],
            detail_path: "/promo/view/".to_string(),
            listing_path_segment: "/promo/races/".to_string(),
            coupons_segment: "/coupons/".to_string(),
            paged_post_template: "https://myrace.info/races/{race_id}/coupons/pages/{page}/"
                .to_string(),
            items_post_template: "https://myrace.info/races/{race_id}/coupons/items/".to_string(),
            type_slugs: vec!["distance".to_string(), "distance_with_bib".to_string()],
            status_filters: vec!["all".to_string()],
            max_pages: 30,
            brand_placeholder: "MYRACE".to_string(),
            usage_labels: vec![
                "Максимальное количество использования".to_string(),
                "Максимальное количество использований".to_string(),
                "Maximum number of use".to_string(),
                "Maximum number of uses".to_string(),
            ],
        }
    }
}

/// Authenticated-session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Netscape-format cookie file exported by the login tooling
    #[serde(rename = "cookies-path")]
    pub cookies_path: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookies_path: "cookies/myrace_cookies.txt".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_path: "./promo_summary.md".to_string(),
        }
    }
}
