//! Database initialization and connection pooling.
//!
//! Uses SQLite in WAL mode with r2d2 connection pooling. One database file
//! backs one spreadsheet.

use std::path::Path;
use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::info;

use nh_core::config::DatabaseConfig;
use nh_core::error::{NhError, NhResult};

use crate::migrations;
use crate::schema;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database wrapper providing initialization and pooling.
#[derive(Clone)]
pub struct Database {
    pool: Arc<DbPool>,
}

impl Database {
    /// Initialize the database at the given path.
    ///
    /// Creates parent directories, builds the pool with the configured
    /// pragmas, then creates the schema and runs pending migrations.
    pub fn init(db_path: &Path, config: &DatabaseConfig) -> NhResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("initializing database at {}", db_path.display());

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_customizer(Box::new(ConnectionCustomizer {
                wal_mode: config.wal_mode,
            }))
            .build(manager)
            .map_err(|e| NhError::Pool(e.to_string()))?;

        let db = Self {
            pool: Arc::new(pool),
        };

        {
            let conn = db.conn()?;
            schema::create_tables(&conn)?;
            migrations::run_migrations(&conn)?;
        }

        info!("database initialized successfully");
        Ok(db)
    }

    /// Get a connection from the pool.
    pub fn conn(&self) -> NhResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| NhError::Pool(e.to_string()))
    }

    /// Execute a function within a database transaction.
    pub fn transaction<T, F>(&self, f: F) -> NhResult<T>
    where
        F: FnOnce(&Connection) -> NhResult<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| NhError::Database(e.to_string()))?;

        let result = f(&tx)?;

        tx.commit().map_err(|e| NhError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get database statistics.
    pub fn stats(&self) -> NhResult<DatabaseStats> {
        let conn = self.conn()?;

        let count = |table: &str| -> NhResult<i64> {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            conn.query_row(&sql, [], |row| row.get(0))
                .map_err(|e| NhError::Database(e.to_string()))
        };

        Ok(DatabaseStats {
            sheets: count("sheets")?,
            rows: count("sheet_rows")?,
        })
    }
}

/// Database row count statistics.
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub sheets: i64,
    pub rows: i64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sheets={}, rows={}", self.sheets, self.rows)
    }
}

/// r2d2 connection customizer that applies PRAGMA settings.
#[derive(Debug)]
struct ConnectionCustomizer {
    wal_mode: bool,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        if self.wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;
             PRAGMA busy_timeout=5000;
             PRAGMA foreign_keys=ON;",
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (Database, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::init(&path, &DatabaseConfig::default()).unwrap();
        (db, dir)
    }

    #[test]
    fn test_database_init() {
        let (db, _dir) = test_db();
        let stats = db.stats().unwrap();
        assert_eq!(stats.sheets, 0);
        assert_eq!(stats.rows, 0);
    }

    #[test]
    fn test_transaction() {
        let (db, _dir) = test_db();
        let result = db.transaction(|conn| {
            conn.execute(
                "INSERT INTO sheets (name, headers) VALUES (?1, ?2)",
                rusqlite::params!["Articles", "[]"],
            )
            .map_err(|e| NhError::Database(e.to_string()))?;
            Ok(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(db.stats().unwrap().sheets, 1);
    }
}
