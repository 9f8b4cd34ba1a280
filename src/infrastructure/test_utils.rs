/// Test utilities for store-level tests
///
/// Each `TestStore` owns a fresh in-memory slot, so tests never share state.
/// The fixture keeps a second handle on the slot to inspect the raw content
/// and to simulate a full device.
///
/// ## Usage Examples
///
/// ```ignore
/// use crate::infrastructure::test_utils::test_harness::TestStore;
///
/// #[test]
/// fn my_test() {
///     let test_store = TestStore::seeded(&[WeightEntry::new("2024-01-01", 70.0)]);
///     test_store.store().remove("2024-01-01").unwrap();
///     assert_eq!(test_store.raw().as_deref(), Some("[]"));
/// }
/// ```
#[cfg(test)]
pub mod test_harness {
    use crate::entities::WeightEntry;
    use crate::errors::StorageError;
    use crate::infrastructure::{
        EntryStore, HookRegistry, MemoryStorage, STORAGE_KEY, SimpleLoggerHook, SlotStorage,
    };
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Slot storage handle that shares one `MemoryStorage` with the fixture
    struct SharedMemory(Rc<MemoryStorage>);

    impl SlotStorage for SharedMemory {
        fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.read_raw(key)
        }

        fn write_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.write_raw(key, value)
        }

        fn backend_info(&self) -> &str {
            self.0.backend_info()
        }
    }

    pub struct TestStore {
        store: EntryStore,
        memory: Rc<MemoryStorage>,
        log_dir: Option<TempDir>,
    }

    impl TestStore {
        /// Store over an empty slot
        pub fn new() -> Self {
            Self::build(MemoryStorage::new(), HookRegistry::new(), None)
        }

        /// Store whose slot already holds `raw`
        pub fn with_raw(raw: &str) -> Self {
            Self::build(
                MemoryStorage::with_slot(STORAGE_KEY, raw),
                HookRegistry::new(),
                None,
            )
        }

        /// Store whose slot holds `entries`, serialized the way the store writes them
        pub fn seeded(entries: &[WeightEntry]) -> Self {
            let raw = serde_json::to_string(entries).expect("Failed to serialize seed entries");
            Self::with_raw(&raw)
        }

        /// Store with the write-log plugin writing into a temp directory
        pub fn with_write_log() -> Self {
            let log_dir = TempDir::new().expect("Failed to create temp directory");
            let mut hooks = HookRegistry::new();
            hooks.register(SimpleLoggerHook::new(log_dir.path().to_path_buf()));
            Self::build(MemoryStorage::new(), hooks, Some(log_dir))
        }

        fn build(memory: MemoryStorage, hooks: HookRegistry, log_dir: Option<TempDir>) -> Self {
            let memory = Rc::new(memory);
            let store = EntryStore::with_hooks(Box::new(SharedMemory(memory.clone())), hooks);
            Self {
                store,
                memory,
                log_dir,
            }
        }

        pub fn store(&self) -> &EntryStore {
            &self.store
        }

        pub fn memory(&self) -> &MemoryStorage {
            &self.memory
        }

        /// Current raw slot content
        pub fn raw(&self) -> Option<String> {
            self.memory
                .read_raw(STORAGE_KEY)
                .expect("Memory storage reads cannot fail")
        }

        /// Content of the write log, empty if nothing was written
        pub fn write_log(&self) -> String {
            self.log_dir
                .as_ref()
                .map(|dir| SimpleLoggerHook::new(dir.path().to_path_buf()).log_path())
                .and_then(|path| std::fs::read_to_string(path).ok())
                .unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use crate::entities::WeightEntry;

    #[test]
    fn test_harness_isolation() {
        let first = TestStore::new();
        let second = TestStore::new();

        first
            .store()
            .upsert(WeightEntry::new("2024-03-15", 70.0))
            .unwrap();

        assert_eq!(first.store().read_all().len(), 1);
        assert!(second.store().read_all().is_empty());
        assert!(second.raw().is_none());
    }

    #[test]
    fn test_seeded_store_reads_back_seed() {
        let seed = vec![
            WeightEntry::new("2024-03-14", 70.5),
            WeightEntry::new("2024-03-15", 70.0),
        ];
        let test_store = TestStore::seeded(&seed);

        assert_eq!(test_store.store().read_all(), seed);
        assert!(test_store.write_log().is_empty());
    }
}
