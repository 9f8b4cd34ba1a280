use crate::application::trend::{self, LinearTrend};
use crate::application::{Config, StorageBackend};
use crate::entities::{FilterPeriod, WeightEntry, date_key, parse_weight_input};
use crate::infrastructure::{
    DuckDbSlotStorage, EntryStore, FileSlotStorage, HookRegistry, ImportFormat, MergeSummary,
    SimpleLoggerHook, SlotStorage, export_file_name, render_export,
};
use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::info;
use std::path::{Path, PathBuf};

pub struct TrackerApp {
    store: EntryStore,
    config: Config,
}

/// Everything the `trend` command shows for one period.
#[derive(Debug, Clone)]
pub struct TrendReport {
    pub period: FilterPeriod,
    pub entries: Vec<WeightEntry>,
    pub change: Option<f64>,
    pub trend: Option<LinearTrend>,
    pub forecast: Option<(NaiveDate, f64)>,
}

impl TrackerApp {
    pub fn new() -> Result<Self> {
        Self::with_default_plugins()
    }

    pub fn with_default_plugins() -> Result<Self> {
        let config = Config::from_env()?;

        // Set up hook registry with default plugins
        let mut hook_registry = HookRegistry::new();
        hook_registry.register(SimpleLoggerHook::new(config.data_dir.clone()));

        let storage = Self::open_storage(&config)?;
        let store = EntryStore::with_hooks(storage, hook_registry);
        Ok(Self { store, config })
    }

    pub fn without_plugins() -> Result<Self> {
        let config = Config::from_env()?;
        let storage = Self::open_storage(&config)?;
        let store = EntryStore::new(storage);
        Ok(Self { store, config })
    }

    pub fn with_store(store: EntryStore, config: Config) -> Self {
        Self { store, config }
    }

    fn open_storage(config: &Config) -> Result<Box<dyn SlotStorage>> {
        let storage: Box<dyn SlotStorage> = match config.backend {
            StorageBackend::File => Box::new(FileSlotStorage::new(config.data_dir.clone())),
            StorageBackend::DuckDb => {
                std::fs::create_dir_all(&config.data_dir).with_context(|| {
                    format!("Failed to create {}", config.data_dir.display())
                })?;
                let db_path = config.database_path();
                Box::new(
                    DuckDbSlotStorage::new(&db_path)
                        .with_context(|| format!("Failed to open {}", db_path.display()))?,
                )
            }
        };
        info!("Using {}", storage.backend_info());
        Ok(storage)
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn entries(&self) -> Vec<WeightEntry> {
        self.store.read_all()
    }

    /// Records `weight_input` for `date`, replacing any earlier value.
    pub fn add_weight(&self, date: NaiveDate, weight_input: &str) -> Result<WeightEntry> {
        let weight = parse_weight_input(weight_input)?;
        let entry = WeightEntry::on(date, weight).rounded();

        self.store
            .upsert(entry.clone())
            .context("Failed to save the entry")?;
        Ok(entry)
    }

    /// Saves a new weight for an existing entry, at `to_date` when given.
    /// The entry at `date` is left in place when it moves.
    pub fn edit_weight(
        &self,
        date: NaiveDate,
        weight_input: &str,
        to_date: Option<NaiveDate>,
    ) -> Result<WeightEntry> {
        let key = date_key(date);
        if self.store.get(&key).is_none() {
            bail!("No entry recorded for {}", key);
        }
        self.add_weight(to_date.unwrap_or(date), weight_input)
    }

    /// Deletes the entry for `date`; returns whether one existed.
    pub fn delete_weight(&self, date: NaiveDate) -> Result<bool> {
        let key = date_key(date);
        let existed = self.store.get(&key).is_some();

        self.store
            .remove(&key)
            .context("Failed to delete the entry")?;
        Ok(existed)
    }

    pub fn trend_report(
        &self,
        period: FilterPeriod,
        today: NaiveDate,
        forecast_days: i64,
    ) -> TrendReport {
        let entries = trend::filter_by_period(&self.store.read_all(), period, today);
        let change = trend::weight_change(&entries);
        let fitted = LinearTrend::fit(&entries);
        let forecast = fitted.and_then(|line| {
            let target = Duration::try_days(forecast_days)
                .and_then(|offset| today.checked_add_signed(offset))?;
            Some((target, line.forecast(target)))
        });

        TrendReport {
            period,
            entries,
            change,
            trend: fitted,
            forecast,
        }
    }

    /// Writes a backup file into `output_dir` (or the configured export
    /// directory) and returns its path.
    pub fn export(
        &self,
        format: ImportFormat,
        output_dir: Option<&Path>,
        now: NaiveDateTime,
    ) -> Result<PathBuf> {
        let entries = self.store.read_all();
        if entries.is_empty() {
            bail!("No data to export");
        }

        let dir = output_dir.unwrap_or(self.config.export_dir.as_path());
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let path = dir.join(export_file_name(now, format));
        let content = render_export(&entries, format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Exported {} entries to {}", entries.len(), path.display());
        Ok(path)
    }

    pub fn import(&self, path: &Path, format: Option<ImportFormat>) -> Result<MergeSummary> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let format = format.unwrap_or_else(|| ImportFormat::detect(path, &content));

        self.store
            .import_document(&content, format)
            .with_context(|| format!("Failed to import {}", path.display()))
    }
}
