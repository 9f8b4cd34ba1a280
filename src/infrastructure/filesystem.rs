use crate::errors::StorageError;
use crate::infrastructure::SlotStorage;
use log::debug;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Keeps each slot as `<key>.json` inside the data directory.
pub struct FileSlotStorage {
    data_dir: PathBuf,
}

impl FileSlotStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SlotStorage for FileSlotStorage {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);

        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);

        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| Self::io_error(&self.data_dir, e))?;

        // Stage next to the target so the rename stays on one filesystem
        let mut staged =
            NamedTempFile::new_in(&self.data_dir).map_err(|e| Self::io_error(&self.data_dir, e))?;
        staged
            .write_all(value.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| Self::io_error(staged.path(), e))?;
        staged
            .persist(&path)
            .map_err(|e| Self::io_error(&path, e.error))?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn backend_info(&self) -> &str {
        "JSON file slot storage"
    }
}
