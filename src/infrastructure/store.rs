use crate::entities::{ImportRecord, WeightEntry};
use crate::errors::{StoreError, StoreResult};
use crate::infrastructure::reconcile::{self, Merged};
use crate::infrastructure::transfer::{self, ImportFormat};
use crate::infrastructure::{HookRegistry, SlotStorage, WriteContext, WriteOperation};
use log::{debug, info, warn};
use serde_json::Value;

/// Slot holding the serialized entry collection.
pub const STORAGE_KEY: &str = "weightEntries";

/// What a tolerant read of the slot found.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// Usable entries, coerced and sorted by date
    Entries(Vec<WeightEntry>),
    /// The slot has never been written
    Missing,
    /// The slot holds something that is not an entry array
    Corrupt { reason: String },
}

impl ReadOutcome {
    pub fn into_entries(self) -> Vec<WeightEntry> {
        match self {
            ReadOutcome::Entries(entries) => entries,
            ReadOutcome::Missing | ReadOutcome::Corrupt { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub accepted: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Sole owner of the persisted weight collection.
///
/// Every mutation reads the whole collection, transforms it in memory and
/// writes it back in a single `write_raw` call.
pub struct EntryStore {
    storage: Box<dyn SlotStorage>,
    hook_registry: HookRegistry,
}

impl EntryStore {
    pub fn new(storage: Box<dyn SlotStorage>) -> Self {
        Self {
            storage,
            hook_registry: HookRegistry::new(),
        }
    }

    pub fn with_hooks(storage: Box<dyn SlotStorage>, hook_registry: HookRegistry) -> Self {
        Self {
            storage,
            hook_registry,
        }
    }

    pub fn backend_info(&self) -> &str {
        self.storage.backend_info()
    }

    /// Reads the slot. Only a failing storage backend is an error; missing or
    /// malformed content is reported as an outcome.
    pub fn read_outcome(&self) -> StoreResult<ReadOutcome> {
        let Some(raw) = self.storage.read_raw(STORAGE_KEY)? else {
            return Ok(ReadOutcome::Missing);
        };

        Ok(match coerce_entries(&raw) {
            Ok(mut entries) => {
                reconcile::sort_by_date(&mut entries);
                ReadOutcome::Entries(entries)
            }
            Err(reason) => ReadOutcome::Corrupt { reason },
        })
    }

    /// All entries sorted by date. Never fails: unreadable or corrupt data
    /// is logged and read as an empty collection.
    pub fn read_all(&self) -> Vec<WeightEntry> {
        match self.read_outcome() {
            Ok(ReadOutcome::Corrupt { reason }) => {
                warn!("Ignoring corrupt weight entries: {}", reason);
                Vec::new()
            }
            Ok(outcome) => outcome.into_entries(),
            Err(e) => {
                warn!("Failed to read weight entries: {}", e);
                Vec::new()
            }
        }
    }

    pub fn get(&self, date: &str) -> Option<WeightEntry> {
        self.read_all().into_iter().find(|entry| entry.date == date)
    }

    /// Inserts or replaces the entry for `entry.date`.
    pub fn upsert(&self, entry: WeightEntry) -> StoreResult<()> {
        let record = ImportRecord::from(entry);
        let merged = self.merge_into_current(std::slice::from_ref(&record))?;

        if merged.accepted == 0 {
            warn!("Ignoring invalid entry {:?}", record);
            return Ok(());
        }

        self.write_entries(&merged.entries, WriteOperation::Upsert)
    }

    /// Removes any record stored under `date`. Works on the raw slot so that
    /// records the read view would drop are kept as they are.
    pub fn remove(&self, date: &str) -> StoreResult<()> {
        let Some(raw) = self.storage.read_raw(STORAGE_KEY)? else {
            return Ok(());
        };

        let mut records = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                warn!("Cannot delete {}: stored entries are not an array", date);
                return Ok(());
            }
            Err(e) => {
                warn!("Cannot delete {}: stored entries are unreadable: {}", date, e);
                return Ok(());
            }
        };

        let before = records.len();
        records.retain(|record| record.get("date").and_then(Value::as_str) != Some(date));
        if records.len() == before {
            debug!("No entry stored for {}", date);
            return Ok(());
        }

        let content = serde_json::to_string(&records).map_err(StoreError::Serialize)?;
        self.write_content(&content, records.len(), WriteOperation::Remove)
    }

    /// Merges `incoming` into the stored collection, incoming winning on
    /// conflicting dates.
    pub fn bulk_merge(&self, incoming: &[ImportRecord]) -> StoreResult<MergeSummary> {
        let merged = self.merge_into_current(incoming)?;
        self.write_entries(&merged.entries, WriteOperation::BulkMerge)?;

        let summary = MergeSummary {
            accepted: merged.accepted,
            skipped: merged.skipped,
            total: merged.entries.len(),
        };
        info!(
            "Imported {} entries ({} skipped), {} stored",
            summary.accepted, summary.skipped, summary.total
        );
        Ok(summary)
    }

    /// Parses an import document and merges it. A malformed document is
    /// rejected before the slot is touched.
    pub fn import_document(&self, text: &str, format: ImportFormat) -> StoreResult<MergeSummary> {
        let records = transfer::parse_import(text, format)?;
        self.bulk_merge(&records)
    }

    fn merge_into_current(&self, incoming: &[ImportRecord]) -> StoreResult<Merged> {
        let current = match self.read_outcome()? {
            ReadOutcome::Corrupt { reason } => {
                warn!("Replacing corrupt weight entries: {}", reason);
                Vec::new()
            }
            outcome => outcome.into_entries(),
        };
        Ok(reconcile::merge(&current, incoming))
    }

    fn write_entries(&self, entries: &[WeightEntry], operation: WriteOperation) -> StoreResult<()> {
        let content = serde_json::to_string(entries).map_err(StoreError::Serialize)?;
        self.write_content(&content, entries.len(), operation)
    }

    fn write_content(
        &self,
        content: &str,
        record_count: usize,
        operation: WriteOperation,
    ) -> StoreResult<()> {
        self.storage.write_raw(STORAGE_KEY, content)?;
        debug!("{} wrote {} entries", operation, record_count);

        let context = WriteContext {
            key: STORAGE_KEY.to_string(),
            operation,
            record_count,
            content: content.to_string(),
        };
        self.hook_registry.execute_write_hooks(&context);

        Ok(())
    }
}

/// Parses the slot content, coercing weights and dropping records whose
/// weight is not a finite number.
fn coerce_entries(raw: &str) -> Result<Vec<WeightEntry>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let Value::Array(records) = value else {
        return Err("top-level value is not an array".to_string());
    };

    Ok(records
        .iter()
        .filter_map(|record| {
            let date = record.get("date")?.as_str()?;
            let weight = coerce_weight(record.get("weight")?)?;
            Some(WeightEntry::new(date, weight))
        })
        .collect())
}

fn coerce_weight(value: &Value) -> Option<f64> {
    let weight = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    weight.is_finite().then_some(weight)
}
