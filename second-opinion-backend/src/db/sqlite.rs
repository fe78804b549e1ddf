//! SQLite handle shared by the whole process.
//!
//! Opened once at start-up and passed around as `Arc<Database>`. Each query
//! checks a connection out of an r2d2 pool; SQLite itself serializes writers.

use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

use crate::error::StoreError;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS medical_details (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        details TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_medical_details_created_at
        ON medical_details (created_at, id);
";

pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        let pool = r2d2::Pool::builder().build(manager)?;

        Self::init(pool)
    }

    /// Private in-memory database. Limited to one connection, since every
    /// `:memory:` connection would otherwise see its own empty database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder().max_size(1).build(manager)?;

        Self::init(pool)
    }

    fn init(pool: DbPool) -> Result<Self, StoreError> {
        let db = Self { pool };
        db.conn()?.execute_batch(SCHEMA)?;
        log::info!("[STORE] Schema ready");
        Ok(db)
    }

    /// Check a connection out of the pool
    pub fn conn(&self) -> Result<DbConn, StoreError> {
        Ok(self.pool.get()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_parent_dirs_and_is_reopenable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.db");

        {
            let db = Database::open(&path).expect("Failed to open database");
            db.add_medical_detail("persisted across restarts").unwrap();
        }
        assert!(path.exists());

        let db = Database::open(&path).expect("Failed to reopen database");
        let details = db.list_medical_details().unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].details, "persisted across restarts");
    }
}
