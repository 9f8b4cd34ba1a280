use anyhow::{Result, bail};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    DuckDb,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "file" | "json" => Ok(StorageBackend::File),
            "duckdb" | "db" => Ok(StorageBackend::DuckDb),
            other => bail!("unknown storage backend '{}' (expected 'file' or 'duckdb')", other),
        }
    }
}

pub struct Config {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub backend: StorageBackend,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("PESO_TRACKER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("peso-tracker")
            });

        let export_dir = std::env::var("PESO_TRACKER_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let backend = match std::env::var("PESO_TRACKER_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::File,
        };

        Ok(Self {
            data_dir,
            export_dir,
            backend,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("peso_tracker.db")
    }
}
