use crate::config::types::{Config, HttpConfig, OutputConfig};
use crate::{ConfigError, ConfigResult};

/// Validates the entire configuration
///
/// Rows with a blank `url` are allowed and skipped at audit time, but at
/// least one row must have a URL to audit.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;

    if config.pages.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[page]] entry is required".to_string(),
        ));
    }

    if config.audit_rows().is_empty() {
        return Err(ConfigError::Validation(format!(
            "none of the {} [[page]] entries has a url to audit",
            config.pages.len()
        )));
    }

    for (i, row) in config.pages.iter().enumerate() {
        for (slot, pair) in row.pairs().iter().enumerate() {
            if pair.anchor_text.is_some() && !pair.is_checkable() {
                tracing::warn!(
                    "[[page]] #{} ({}): anchor{} has no url{}, the pair will not be checked",
                    i + 1,
                    row.url,
                    slot + 1,
                    slot + 1
                );
            }
        }
    }

    Ok(())
}

/// Validates the `[http]` section
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "[http] user-agent cannot be empty".to_string(),
        ));
    }

    let timeouts = [
        ("head-timeout-secs", config.head_timeout_secs),
        ("get-timeout-secs", config.get_timeout_secs),
        ("robots-timeout-secs", config.robots_timeout_secs),
    ];
    for (name, value) in timeouts {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "[http] {} must be at least 1 second, got {}",
                name, value
            )));
        }
    }

    if config.max_redirects < 1 || config.max_redirects > 100 {
        return Err(ConfigError::Validation(format!(
            "[http] max-redirects must be between 1 and 100, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates the `[output]` section
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.results_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "[output] results-path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "[output] summary-path cannot be empty".to_string(),
        ));
    }

    if config.results_path.trim() == config.summary_path.trim() {
        return Err(ConfigError::Validation(format!(
            "[output] results-path and summary-path both point to {}",
            config.results_path
        )));
    }

    Ok(())
}
