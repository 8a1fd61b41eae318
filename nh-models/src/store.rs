//! Spreadsheet-shaped row store.
//!
//! The `RowStore` trait is the contract every component writes rows
//! through: named sheets, a header row, and data rows of string cells kept
//! in append order. `SheetStore` implements it on the SQLite database.

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use nh_core::error::{NhError, NhResult};

use crate::db::Database;

/// One row of string cells.
pub type Cells = Vec<String>;

/// A data row together with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub id: i64,
    pub cells: Cells,
}

impl StoredRow {
    /// Cell at `col`, or `""` when the row is shorter.
    pub fn cell(&self, col: usize) -> &str {
        self.cells.get(col).map(String::as_str).unwrap_or("")
    }
}

/// Column lookup by header name.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(headers: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            // first occurrence wins, like a spreadsheet indexOf
            columns.entry(name.clone()).or_insert(i);
        }
        Self { columns }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Value of the named column in `cells`, `""` if the column or cell is absent.
    pub fn get<'a>(&self, cells: &'a [String], name: &str) -> &'a str {
        self.column(name)
            .and_then(|i| cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Row-oriented backing store.
pub trait RowStore: Send + Sync {
    /// Create the sheet if missing and write its header row. Existing data
    /// rows are untouched; extra trailing header cells are kept.
    /// Returns `true` when the sheet was created.
    fn ensure_sheet(&self, sheet: &str, headers: &[&str]) -> NhResult<bool>;

    fn has_sheet(&self, sheet: &str) -> NhResult<bool>;

    fn headers(&self, sheet: &str) -> NhResult<Cells>;

    /// The physically last data row, if any.
    fn last_row(&self, sheet: &str) -> NhResult<Option<StoredRow>>;

    /// Append rows in order as one batch. Either all rows land or none do.
    fn append_rows(&self, sheet: &str, rows: &[Cells]) -> NhResult<usize>;

    /// All data rows in append order.
    fn read_rows(&self, sheet: &str) -> NhResult<Vec<StoredRow>>;

    /// Header row followed by every data row.
    fn read_all_rows(&self, sheet: &str) -> NhResult<Vec<Cells>>;

    fn update_row(&self, sheet: &str, id: i64, cells: &[String]) -> NhResult<()>;

    fn delete_row(&self, sheet: &str, id: i64) -> NhResult<()>;
}

/// SQLite-backed [`RowStore`].
#[derive(Clone)]
pub struct SheetStore {
    db: Database,
}

impl SheetStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn require_sheet(conn: &Connection, sheet: &str) -> NhResult<()> {
        if Self::sheet_exists(conn, sheet)? {
            Ok(())
        } else {
            Err(NhError::SheetNotFound(sheet.to_string()))
        }
    }

    fn sheet_exists(conn: &Connection, sheet: &str) -> NhResult<bool> {
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sheets WHERE name = ?1",
                params![sheet],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| NhError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    fn load_headers(conn: &Connection, sheet: &str) -> NhResult<Option<Cells>> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT headers FROM sheets WHERE name = ?1",
                params![sheet],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| NhError::Database(e.to_string()))?;
        raw.map(|json| decode_cells(sheet, &json)).transpose()
    }
}

fn encode_cells(cells: &[String]) -> NhResult<String> {
    Ok(serde_json::to_string(cells)?)
}

fn decode_cells(sheet: &str, json: &str) -> NhResult<Cells> {
    serde_json::from_str(json).map_err(|e| NhError::MalformedRow {
        sheet: sheet.to_string(),
        reason: e.to_string(),
    })
}

impl RowStore for SheetStore {
    fn ensure_sheet(&self, sheet: &str, headers: &[&str]) -> NhResult<bool> {
        if sheet.is_empty() {
            return Err(NhError::InvalidInput("sheet name is empty".into()));
        }

        self.db.transaction(|conn| {
            let existing = Self::load_headers(conn, sheet)?;
            let created = existing.is_none();

            let mut merged: Cells = headers.iter().map(|h| h.to_string()).collect();
            if let Some(old) = existing {
                merged.extend(old.into_iter().skip(headers.len()));
            }
            let encoded = encode_cells(&merged)?;

            conn.execute(
                "INSERT INTO sheets (name, headers) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET headers = excluded.headers",
                params![sheet, encoded],
            )
            .map_err(|e| NhError::Database(e.to_string()))?;

            if created {
                info!(sheet, "created sheet");
            } else {
                debug!(sheet, "sheet headers refreshed");
            }
            Ok(created)
        })
    }

    fn has_sheet(&self, sheet: &str) -> NhResult<bool> {
        let conn = self.db.conn()?;
        Self::sheet_exists(&conn, sheet)
    }

    fn headers(&self, sheet: &str) -> NhResult<Cells> {
        let conn = self.db.conn()?;
        Self::load_headers(&conn, sheet)?.ok_or_else(|| NhError::SheetNotFound(sheet.to_string()))
    }

    fn last_row(&self, sheet: &str) -> NhResult<Option<StoredRow>> {
        let conn = self.db.conn()?;
        Self::require_sheet(&conn, sheet)?;

        let raw: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, cells FROM sheet_rows WHERE sheet = ?1 ORDER BY id DESC LIMIT 1",
                params![sheet],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| NhError::Database(e.to_string()))?;

        raw.map(|(id, json)| {
            Ok(StoredRow {
                id,
                cells: decode_cells(sheet, &json)?,
            })
        })
        .transpose()
    }

    fn append_rows(&self, sheet: &str, rows: &[Cells]) -> NhResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        self.db.transaction(|conn| {
            Self::require_sheet(conn, sheet)?;
            let mut stmt = conn
                .prepare_cached("INSERT INTO sheet_rows (sheet, cells) VALUES (?1, ?2)")
                .map_err(|e| NhError::Database(e.to_string()))?;
            for row in rows {
                stmt.execute(params![sheet, encode_cells(row)?])
                    .map_err(|e| NhError::Database(e.to_string()))?;
            }
            debug!(sheet, count = rows.len(), "appended rows");
            Ok(rows.len())
        })
    }

    fn read_rows(&self, sheet: &str) -> NhResult<Vec<StoredRow>> {
        let conn = self.db.conn()?;
        Self::require_sheet(&conn, sheet)?;

        let mut stmt = conn
            .prepare_cached("SELECT id, cells FROM sheet_rows WHERE sheet = ?1 ORDER BY id ASC")
            .map_err(|e| NhError::Database(e.to_string()))?;
        let raw = stmt
            .query_map(params![sheet], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| NhError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NhError::Database(e.to_string()))?;

        raw.into_iter()
            .map(|(id, json)| {
                Ok(StoredRow {
                    id,
                    cells: decode_cells(sheet, &json)?,
                })
            })
            .collect()
    }

    fn read_all_rows(&self, sheet: &str) -> NhResult<Vec<Cells>> {
        let mut all = vec![self.headers(sheet)?];
        all.extend(self.read_rows(sheet)?.into_iter().map(|r| r.cells));
        Ok(all)
    }

    fn update_row(&self, sheet: &str, id: i64, cells: &[String]) -> NhResult<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE sheet_rows SET cells = ?1 WHERE sheet = ?2 AND id = ?3",
                params![encode_cells(cells)?, sheet, id],
            )
            .map_err(|e| NhError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(NhError::Database(format!("row {id} not found in {sheet}")));
        }
        Ok(())
    }

    fn delete_row(&self, sheet: &str, id: i64) -> NhResult<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "DELETE FROM sheet_rows WHERE sheet = ?1 AND id = ?2",
                params![sheet, id],
            )
            .map_err(|e| NhError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(NhError::Database(format!("row {id} not found in {sheet}")));
        }
        Ok(())
    }
}
