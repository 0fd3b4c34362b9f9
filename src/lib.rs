//! Promo-Sweep: promo-code discovery for MyRace-style race registration sites
//!
//! This crate crawls the promo-code listing pages of a race-registration site
//! that exposes no public API, collects every reachable promo detail page,
//! extracts the code string and remaining-usage count from each, and produces
//! a grouped usage report.

pub mod config;
pub mod crawler;
pub mod detail;
pub mod report;
pub mod session;

use thiserror::Error;

/// Main error type for Promo-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Cookie file error for {path}: {message}")]
    CookieFile { path: String, message: String },

    #[error("no promo links discovered for race {race_id}")]
    NoPromoLinks {
        race_id: String,
        /// Truncated body of the primary listing URL, fetched for operator
        /// inspection when discovery comes up empty.
        diagnostic: String,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Promo-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{discover, Method, Payload, PromoLink, Task};
pub use detail::PromoUsageInfo;
pub use report::{build_report, PromoReport};

#[cfg(test)]
mod tests {
    use super::*;

    /// Every variant here is constructed somewhere in the crate; the
    /// exhaustive match (no wildcard) keeps unreachable variants from
    /// accumulating in the error surface.
    fn classify(error: &SweepError) -> &'static str {
        match error {
            SweepError::Config(_) => "config",
            SweepError::Reqwest(_) => "http",
            SweepError::Pattern(_) => "pattern",
            SweepError::CookieFile { .. } => "cookie-file",
            SweepError::NoPromoLinks { .. } => "discovery",
        }
    }

    #[test]
    fn test_config_error_converts_and_displays() {
        let error = SweepError::from(ConfigError::Validation("bad value".to_string()));
        assert_eq!(classify(&error), "config");
        assert!(error.to_string().contains("bad value"));
    }

    #[test]
    fn test_discovery_error_names_the_race() {
        let error = SweepError::NoPromoLinks {
            race_id: "1440".to_string(),
            diagnostic: "<empty body>".to_string(),
        };
        assert_eq!(classify(&error), "discovery");
        assert!(error.to_string().contains("1440"));
    }

    #[test]
    fn test_cookie_file_error_names_the_path() {
        let error = SweepError::CookieFile {
            path: "/tmp/cookies.txt".to_string(),
            message: "permission denied".to_string(),
        };
        assert_eq!(classify(&error), "cookie-file");
        assert!(error.to_string().contains("/tmp/cookies.txt"));
    }
}
