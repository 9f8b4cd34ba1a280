use crate::errors::StorageError;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// A string-keyed blob store. The entry store keeps its whole collection in
/// one slot and always replaces the slot as a unit.
pub trait SlotStorage {
    /// Raw content of the slot, `None` if it was never written
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the content of the slot
    fn write_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Get storage backend information
    fn backend_info(&self) -> &str;
}

/// In-process slot storage, used by tests and as a scratch backend.
#[derive(Default)]
pub struct MemoryStorage {
    slots: RefCell<HashMap<String, String>>,
    reject_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Make every following write fail, as a full device would.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }
}

impl SlotStorage for MemoryStorage {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend_info(&self) -> &str {
        "In-memory slot storage"
    }
}
