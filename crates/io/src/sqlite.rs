// SQLite key/value store
//
// One table, one row per record. Kept in `<store dir>/board.db`.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use harada_engine::store::{BoardStore, StoreError};

/// Database file name inside the store directory.
pub const DB_FILE: &str = "board.db";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

pub struct SqliteStore {
    conn: Connection,
}

fn map_sql(e: rusqlite::Error) -> StoreError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::DiskFull) => StoreError::QuotaExceeded(e.to_string()),
        Some(rusqlite::ErrorCode::DatabaseBusy)
        | Some(rusqlite::ErrorCode::DatabaseLocked)
        | Some(rusqlite::ErrorCode::CannotOpen)
        | Some(rusqlite::ErrorCode::ReadOnly) => StoreError::Unavailable(e.to_string()),
        Some(rusqlite::ErrorCode::DatabaseCorrupt) | Some(rusqlite::ErrorCode::NotADatabase) => {
            StoreError::Corrupt(e.to_string())
        }
        _ => StoreError::Io(e.to_string()),
    }
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("{}: {}", parent.display(), e)))?;
        }
        let conn = Connection::open(path).map_err(map_sql)?;
        conn.execute_batch(SCHEMA).map_err(map_sql)?;
        Ok(Self { conn })
    }

    /// Open `board.db` inside a store directory.
    pub fn open_in(dir: &Path) -> Result<Self, StoreError> {
        Self::open(&dir.join(DB_FILE))
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(map_sql)?;
        conn.execute_batch(SCHEMA).map_err(map_sql)?;
        Ok(Self { conn })
    }
}

impl BoardStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row("SELECT value FROM records WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(map_sql)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO records (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(map_sql)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM records WHERE key = ?1", params![key])
            .map_err(map_sql)?;
        Ok(())
    }
}
