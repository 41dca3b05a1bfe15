use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration from TOML text
///
/// # Example
///
/// ```
/// use link_auditor::config::parse_config;
///
/// let config = parse_config(r#"
/// [output]
/// results-path = "results.json"
/// summary-path = "summary.md"
///
/// [[page]]
/// url = "https://example.com/post"
/// anchor1 = "Example"
/// url1 = "https://target.example/"
/// "#).unwrap();
/// assert_eq!(config.audit_rows().len(), 1);
/// ```
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads, parses and validates a configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Configuration with at least one page to audit
/// * `Err(ConfigError)` - The file could not be read, is not valid TOML,
///   or failed validation
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use link_auditor::config::load_config;
///
/// let config = load_config(Path::new("audit.toml")).unwrap();
/// println!("User-Agent: {}", config.http.user_agent);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Hex-encoded SHA-256 of a configuration file, recorded in the summary
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads a configuration together with the hash of the exact text parsed
///
/// The file is read once, so the hash always describes the loaded rows.
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(
        "Parsed {} with {} page rows",
        path.display(),
        config.pages.len()
    );
    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
