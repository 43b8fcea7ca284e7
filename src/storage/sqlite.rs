//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CrawlStore trait.

use crate::state::JobState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CrawlStore, StorageError, StorageResult};
use crate::storage::{CrawlRecord, NewCrawl};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::path::Path;

const SELECT_COLUMNS: &str = "SELECT id, url, html_version, title, headings, internal_links, \
     external_links, broken_links, has_login_form, status, error_message, created_at FROM crawls";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file and applies the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_records(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> StorageResult<Vec<CrawlRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, RawRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRow::into_record).collect()
    }
}

/// Column values as stored, before JSON and timestamp decoding
struct RawRow {
    id: i64,
    url: String,
    html_version: Option<String>,
    title: Option<String>,
    headings: Option<String>,
    internal_links: i64,
    external_links: i64,
    broken_links: Option<String>,
    has_login_form: bool,
    status: String,
    error_message: Option<String>,
    created_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            html_version: row.get(2)?,
            title: row.get(3)?,
            headings: row.get(4)?,
            internal_links: row.get(5)?,
            external_links: row.get(6)?,
            broken_links: row.get(7)?,
            has_login_form: row.get(8)?,
            status: row.get(9)?,
            error_message: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn into_record(self) -> StorageResult<CrawlRecord> {
        let id = self.id;
        let corrupt = |message: String| StorageError::CorruptRecord { id, message };

        let status = JobState::from_db_string(&self.status)
            .ok_or_else(|| corrupt(format!("unknown status '{}'", self.status)))?;

        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| corrupt(format!("bad created_at '{}': {}", self.created_at, e)))?
            .with_timezone(&Utc);

        let headings = match self.headings.as_deref() {
            Some(json) => serde_json::from_str(json)?,
            None => Default::default(),
        };

        let broken_links = match self.broken_links.as_deref() {
            Some(json) => serde_json::from_str(json)?,
            None => Vec::new(),
        };

        Ok(CrawlRecord {
            id,
            url: self.url,
            html_version: self.html_version,
            title: self.title,
            headings,
            internal_links: self.internal_links.max(0) as usize,
            external_links: self.external_links.max(0) as usize,
            broken_links,
            has_login_form: self.has_login_form,
            status,
            error_message: self.error_message,
            created_at,
        })
    }
}

impl CrawlStore for SqliteStorage {
    fn insert_crawl(&mut self, crawl: &NewCrawl) -> StorageResult<i64> {
        // Fixed-width UTC timestamps sort lexicographically in time order
        let created_at = crawl
            .created_at
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        match &crawl.result {
            Some(result) => {
                let headings = serde_json::to_string(&result.headings)?;
                let broken_links = serde_json::to_string(&result.broken_links)?;
                self.conn.execute(
                    "INSERT INTO crawls (url, html_version, title, headings, internal_links,
                     external_links, broken_links, has_login_form, status, error_message, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        crawl.url,
                        result.html_version,
                        result.title,
                        headings,
                        result.internal_links as i64,
                        result.external_links as i64,
                        broken_links,
                        result.has_login_form,
                        crawl.status.to_db_string(),
                        crawl.error_message,
                        created_at
                    ],
                )?;
            }
            None => {
                self.conn.execute(
                    "INSERT INTO crawls (url, status, error_message, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        crawl.url,
                        crawl.status.to_db_string(),
                        crawl.error_message,
                        created_at
                    ],
                )?;
            }
        }

        Ok(self.conn.last_insert_rowid())
    }

    fn list_crawls(&self) -> StorageResult<Vec<CrawlRecord>> {
        self.query_records(
            &format!("{} ORDER BY created_at DESC, id DESC", SELECT_COLUMNS),
            &[],
        )
    }

    fn crawls_for_url(&self, url: &str) -> StorageResult<Vec<CrawlRecord>> {
        self.query_records(
            &format!(
                "{} WHERE url = ?1 ORDER BY created_at DESC, id DESC",
                SELECT_COLUMNS
            ),
            &[&url],
        )
    }

    fn count_by_status(&self) -> StorageResult<HashMap<JobState, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM crawls GROUP BY status")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut counts = HashMap::new();
        for (status, count) in rows {
            let state = JobState::from_db_string(&status)
                .ok_or_else(|| StorageError::Database(format!("unknown status '{}'", status)))?;
            counts.insert(state, count as u64);
        }

        Ok(counts)
    }

    fn count_broken_links(&self) -> StorageResult<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(json_array_length(broken_links)), 0) FROM crawls
             WHERE status = 'done' AND broken_links IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }
}
