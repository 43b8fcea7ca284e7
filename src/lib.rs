//! PageScope: a queued web page analyzer
//!
//! This crate accepts page URLs, analyzes them one at a time on a background
//! worker, and records structured findings (doctype, headings, link health,
//! login-form presence) in a SQLite database.

pub mod config;
pub mod crawler;
pub mod output;
pub mod queue;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for PageScope operations
#[derive(Debug, Error)]
pub enum PageScopeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a single page analysis
///
/// Every variant ends the crawl job in a terminal error state; the Display
/// text is what gets persisted as the job's error message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CrawlError {
    #[error("render failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("failed to parse HTML for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("crawl canceled for {url}")]
    Canceled { url: String },
}

impl CrawlError {
    pub fn render(url: &str, message: impl Into<String>) -> Self {
        Self::Render {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn parse(url: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn canceled(url: &str) -> Self {
        Self::Canceled {
            url: url.to_string(),
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for PageScope operations
pub type Result<T> = std::result::Result<T, PageScopeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for a single page analysis
pub type CrawlOutcome<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BrokenLink, CrawlPipeline, CrawlResult, HeadingCounts, PageAnalyzer};
pub use queue::{QueueManager, StatusView, StopOutcome};
pub use state::JobState;
pub use url::{classify_link, LinkClass};
