//! Storage traits and error types
//!
//! This module defines the persistence sink interface the queue manager
//! writes terminal job states through, plus its error type.

use crate::state::JobState;
use crate::storage::{CrawlRecord, NewCrawl};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record {id}: {message}")]
    CorruptRecord { id: i64, message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence sink for crawl outcomes
///
/// Implementations must be `Send` so the queue manager can hand writes to a
/// blocking task.
pub trait CrawlStore: Send {
    /// Records one terminal crawl attempt
    ///
    /// # Returns
    ///
    /// The ID of the new row
    fn insert_crawl(&mut self, crawl: &NewCrawl) -> StorageResult<i64>;

    /// Lists every recorded attempt, most recent first
    fn list_crawls(&self) -> StorageResult<Vec<CrawlRecord>>;

    /// Lists the attempts recorded for one URL, most recent first
    fn crawls_for_url(&self, url: &str) -> StorageResult<Vec<CrawlRecord>>;

    /// Counts recorded attempts by status
    fn count_by_status(&self) -> StorageResult<HashMap<JobState, u64>>;

    /// Sums broken links across successful attempts
    fn count_broken_links(&self) -> StorageResult<u64>;
}
