use crate::browser::Locator;
use crate::config::types::{Config, OutputConfig, ResultCountConfig, SiteConfig, SweepConfig};
use crate::document::compile_selector;
use crate::ConfigError;
use url::Url;

/// Smallest wait bound accepted for any step
const MIN_TIMEOUT_MS: u64 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_sweep_config(&config.sweep)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site url '{}': {}", config.url, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "Site url '{}' must use http or https",
            config.url
        )));
    }

    for (name, locator) in [
        ("search-field", &config.search_field),
        ("search-button", &config.search_button),
        ("first-result", &config.first_result),
        ("next-record", &config.next_record),
        ("ready-landmark", &config.ready_landmark),
    ] {
        validate_locator(name, locator)?;
    }

    validate_result_count(&config.result_count)
}

fn validate_locator(name: &str, locator: &Locator) -> Result<(), ConfigError> {
    if locator.as_str().trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if let Locator::Css(css) = locator {
        compile_selector(css).map_err(|e| {
            ConfigError::Validation(format!("{} is not a valid CSS selector '{}': {}", name, css, e))
        })?;
    }

    Ok(())
}

fn validate_result_count(config: &ResultCountConfig) -> Result<(), ConfigError> {
    compile_selector(&config.selector).map_err(|e| {
        ConfigError::Validation(format!(
            "result-count selector '{}' is invalid: {}",
            config.selector, e
        ))
    })?;

    if let Some(container) = &config.container {
        compile_selector(container).map_err(|e| {
            ConfigError::Validation(format!(
                "result-count container '{}' is invalid: {}",
                container, e
            ))
        })?;
    }

    Ok(())
}

/// Validates the token range and wait bounds
fn validate_sweep_config(config: &SweepConfig) -> Result<(), ConfigError> {
    // Parses both tokens and checks their order
    config.token_range().map_err(|e| match e {
        ConfigError::InvalidToken(msg) => ConfigError::Validation(format!("Invalid token: {}", msg)),
        other => other,
    })?;

    if config.step_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "step-timeout-ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.step_timeout_ms
        )));
    }

    if config.detail_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "detail-timeout-ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.detail_timeout_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation("csv-path cannot be empty".to_string()));
    }

    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
