use serde::Deserialize;

use crate::state::JobState;

/// Main configuration structure for PageScope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Timeouts and probe limits for a single page analysis
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Hard deadline for one crawl attempt (seconds)
    #[serde(rename = "crawl-timeout-secs", default = "default_crawl_timeout")]
    pub crawl_timeout_secs: u64,

    /// Timeout for fetching the page itself (seconds)
    #[serde(rename = "render-timeout-secs", default = "default_render_timeout")]
    pub render_timeout_secs: u64,

    /// Timeout for each link existence check (seconds)
    #[serde(rename = "probe-timeout-secs", default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Maximum number of link checks in flight at once
    #[serde(rename = "max-concurrent-probes", default = "default_max_probes")]
    pub max_concurrent_probes: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            crawl_timeout_secs: default_crawl_timeout(),
            render_timeout_secs: default_render_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            max_concurrent_probes: default_max_probes(),
        }
    }
}

fn default_crawl_timeout() -> u64 {
    120
}

fn default_render_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_max_probes() -> u32 {
    8
}

/// Queue terminal-state policies
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct QueueConfig {
    #[serde(rename = "stop-policy", default)]
    pub stop_policy: StopPolicy,

    #[serde(rename = "cancel-policy", default)]
    pub cancel_policy: CancelPolicy,
}

/// State recorded when a running job is stopped by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopPolicy {
    /// A stopped job counts as a failed crawl
    #[default]
    Error,
    /// A stopped job gets its own terminal state
    Stopped,
}

impl StopPolicy {
    pub fn terminal_state(&self) -> JobState {
        match self {
            Self::Error => JobState::Error,
            Self::Stopped => JobState::Stopped,
        }
    }
}

/// What the pipeline does with a result whose analysis was cut short
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelPolicy {
    /// Return whatever was collected before cancellation as a success
    #[default]
    KeepPartial,
    /// Fail the analysis whenever cancellation was observed
    Discard,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PageScope".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./pagescope.db".to_string(),
        }
    }
}
