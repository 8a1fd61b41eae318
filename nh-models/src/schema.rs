//! Database schema definitions and table creation.
//!
//! A spreadsheet is stored as two tables: `sheets` (name + header row) and
//! `sheet_rows` (one JSON array of cells per row). Row order is the
//! autoincrement id, which gives the append ordering a spreadsheet has.

use rusqlite::Connection;
use tracing::debug;

use nh_core::error::{NhError, NhResult};

/// Create all database tables if they do not exist.
pub fn create_tables(conn: &Connection) -> NhResult<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| NhError::Database(format!("failed to create schema: {e}")))?;
    debug!("database schema verified");
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Named sheets with their header row
CREATE TABLE IF NOT EXISTS sheets (
    name        TEXT PRIMARY KEY,
    headers     TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

-- Data rows, append-ordered by id
CREATE TABLE IF NOT EXISTS sheet_rows (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    sheet       TEXT NOT NULL REFERENCES sheets(name) ON DELETE CASCADE,
    cells       TEXT NOT NULL DEFAULT '[]'
);
"#;
