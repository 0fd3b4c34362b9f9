use crate::config::types::{Config, SessionConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_session_config(&config.session)?;

    if config.output.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::Validation(format!("Invalid base_url: {}", e)))?;

    if config.listing_templates.is_empty() {
        return Err(ConfigError::Validation(
            "listing_templates must contain at least one template".to_string(),
        ));
    }

    for template in &config.listing_templates {
        if !template.contains("{race_id}") {
            return Err(ConfigError::Validation(format!(
                "listing template '{}' is missing the {{race_id}} placeholder",
                template
            )));
        }
    }

    for template in [&config.paged_post_template, &config.items_post_template] {
        if !template.contains("{race_id}") {
            return Err(ConfigError::Validation(format!(
                "POST template '{}' is missing the {{race_id}} placeholder",
                template
            )));
        }
    }

    if !config.paged_post_template.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "paged_post_template '{}' is missing the {{page}} placeholder",
            config.paged_post_template
        )));
    }

    if config.detail_path.is_empty() {
        return Err(ConfigError::Validation(
            "detail_path cannot be empty".to_string(),
        ));
    }

    if config.max_pages < 1 || config.max_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and 100, got {}",
            config.max_pages
        )));
    }

    if config.usage_labels.is_empty() {
        return Err(ConfigError::Validation(
            "usage_labels must contain at least one label".to_string(),
        ));
    }

    Ok(())
}

/// Validates session configuration
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.cookies_path.is_empty() {
        return Err(ConfigError::Validation(
            "cookies_path cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_templates_rejected() {
        let mut config = Config::default();
        config.site.listing_templates.clear();
        let result = validate(&config);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let mut config = Config::default();
        config
            .site
            .listing_templates
            .push("https://myrace.info/promo/races/1440".to_string());
        let result = validate(&config);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = Config::default();
        config.site.max_pages = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = Config::default();
        config.site.base_url = "not a url".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_excessive_timeout_rejected() {
        let mut config = Config::default();
        config.session.timeout_secs = 3600;
        assert!(validate(&config).is_err());
    }
}
