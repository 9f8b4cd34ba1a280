use anyhow::Result;
use log::warn;
use std::fmt;

/// Which store operation produced a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Upsert,
    Remove,
    BulkMerge,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteOperation::Upsert => "upsert",
            WriteOperation::Remove => "remove",
            WriteOperation::BulkMerge => "bulk-merge",
        };
        write!(f, "{}", name)
    }
}

/// Context provided to write hooks
#[derive(Debug, Clone)]
pub struct WriteContext {
    pub key: String,
    pub operation: WriteOperation,
    pub record_count: usize,
    pub content: String,
}

/// Trait for plugins that respond to slot write events
pub trait WriteHook {
    /// Called after the slot has been successfully written
    fn on_slot_written(&self, context: &WriteContext) -> Result<()>;

    /// Human-readable name for this hook
    fn name(&self) -> &str;
}

/// Registry for managing write hooks
pub struct HookRegistry {
    hooks: Vec<Box<dyn WriteHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a new write hook
    pub fn register<H>(&mut self, hook: H)
    where
        H: WriteHook + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Execute all registered hooks; a failing hook does not stop the others
    pub fn execute_write_hooks(&self, context: &WriteContext) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_slot_written(context) {
                warn!("Hook '{}' failed: {:#}", hook.name(), e);
            }
        }
    }

    /// List all registered hooks
    pub fn list_hooks(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
