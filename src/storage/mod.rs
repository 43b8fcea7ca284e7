//! Storage module for persisting crawl outcomes
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Recording one row per terminal crawl attempt
//! - Reading results back, most recent first

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{CrawlStore, StorageError, StorageResult};

use crate::crawler::{BrokenLink, CrawlResult, HeadingCounts};
use crate::state::JobState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Opens (or creates) the SQLite database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A crawl attempt about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewCrawl {
    pub url: String,
    pub status: JobState,
    /// Present only for successful attempts
    pub result: Option<CrawlResult>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewCrawl {
    /// A finished attempt carrying its full result
    pub fn done(result: CrawlResult) -> Self {
        Self {
            url: result.url.clone(),
            status: JobState::Done,
            result: Some(result),
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// A failed or stopped attempt carrying only the reason
    pub fn failed(url: &str, status: JobState, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            status,
            result: None,
            error_message: Some(message.into()),
            created_at: Utc::now(),
        }
    }
}

/// A crawl attempt read back from the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlRecord {
    pub id: i64,
    pub url: String,
    pub html_version: Option<String>,
    pub title: Option<String>,
    pub headings: HeadingCounts,
    pub internal_links: usize,
    pub external_links: usize,
    pub broken_links: Vec<BrokenLink>,
    pub has_login_form: bool,
    pub status: JobState,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CrawlRecord {
    /// Rebuilds the analysis result for a successful attempt
    pub fn to_result(&self) -> Option<CrawlResult> {
        if self.status != JobState::Done {
            return None;
        }

        Some(CrawlResult {
            url: self.url.clone(),
            html_version: self.html_version.clone().unwrap_or_default(),
            title: self.title.clone().unwrap_or_default(),
            headings: self.headings,
            internal_links: self.internal_links,
            external_links: self.external_links,
            broken_links: self.broken_links.clone(),
            has_login_form: self.has_login_form,
        })
    }
}
