use crate::infrastructure::{WriteContext, WriteHook};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Plugin that appends a line per slot write to `write_log.txt`
pub struct SimpleLoggerHook {
    log_dir: PathBuf,
}

impl SimpleLoggerHook {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join("write_log.txt")
    }
}

impl WriteHook for SimpleLoggerHook {
    fn on_slot_written(&self, context: &WriteContext) -> Result<()> {
        std::fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Failed to create {}", self.log_dir.display()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())?;

        writeln!(
            file,
            "[{}] {} on '{}' - {} entries - {} bytes",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            context.operation,
            context.key,
            context.record_count,
            context.content.len()
        )?;

        Ok(())
    }

    fn name(&self) -> &str {
        "Simple Logger"
    }
}
