use crate::errors::StorageError;
use crate::infrastructure::SlotStorage;
use duckdb::{Connection, OptionalExt, params};
use log::debug;
use std::path::Path;

/// Slot storage backed by a single DuckDB key-value table.
pub struct DuckDbSlotStorage {
    conn: Connection,
}

impl DuckDbSlotStorage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;

        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    fn initialize(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        )?;
        Ok(())
    }
}

impl SlotStorage for DuckDbSlotStorage {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO slots (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
            params![key, value],
        )?;
        debug!("Stored {} bytes in DuckDB slot '{}'", value.len(), key);
        Ok(())
    }

    fn backend_info(&self) -> &str {
        "DuckDB slot storage"
    }
}
