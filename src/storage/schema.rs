//! Database schema definitions
//!
//! One row per crawl attempt. Headings and broken links are stored as JSON
//! text; their shape is fixed by `HeadingCounts` and `BrokenLink`.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS crawls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    html_version TEXT,
    title TEXT,
    headings TEXT,
    internal_links INTEGER NOT NULL DEFAULT 0,
    external_links INTEGER NOT NULL DEFAULT 0,
    broken_links TEXT,
    has_login_form INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL CHECK (status IN ('queued', 'running', 'done', 'error', 'stopped')),
    error_message TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawls_url ON crawls(url);
CREATE INDEX IF NOT EXISTS idx_crawls_created_at ON crawls(created_at);
CREATE INDEX IF NOT EXISTS idx_crawls_status ON crawls(status);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
