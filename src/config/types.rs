use crate::audit::AuditRow;
use crate::fetch::DEFAULT_USER_AGENT;
use serde::Deserialize;

/// Main configuration structure for Link-Auditor
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    pub output: OutputConfig,
    /// Pages to audit, in order
    #[serde(default, rename = "page")]
    pub pages: Vec<AuditRow>,
}

impl Config {
    /// The rows handed to the auditor
    ///
    /// Rows without a URL are dropped here with a warning.
    pub fn audit_rows(&self) -> Vec<AuditRow> {
        self.pages
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                if row.has_url() {
                    Some(row.clone())
                } else {
                    tracing::warn!("Page entry {} has an empty URL, skipping", i + 1);
                    None
                }
            })
            .collect()
    }
}

/// HTTP behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout of each HEAD request (seconds)
    #[serde(default = "default_head_timeout")]
    pub head_timeout_secs: u64,

    /// Timeout of the page GET (seconds)
    #[serde(default = "default_get_timeout")]
    pub get_timeout_secs: u64,

    /// Timeout of the robots.txt GET (seconds)
    #[serde(default = "default_robots_timeout")]
    pub robots_timeout_secs: u64,

    /// Redirects followed before giving up
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            head_timeout_secs: default_head_timeout(),
            get_timeout_secs: default_get_timeout(),
            robots_timeout_secs: default_robots_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_head_timeout() -> u64 {
    10
}

fn default_get_timeout() -> u64 {
    15
}

fn default_robots_timeout() -> u64 {
    5
}

fn default_max_redirects() -> usize {
    30
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the JSON results file
    pub results_path: String,

    /// Path to the markdown summary file
    pub summary_path: String,
}
