pub mod duckdb_storage;
pub mod filesystem;
pub mod hooks;
pub mod plugins;
pub mod reconcile;
pub mod storage;
pub mod store;
pub mod transfer;

#[cfg(test)]
pub mod test_utils;

pub use duckdb_storage::*;
pub use filesystem::*;
pub use hooks::*;
pub use plugins::*;
pub use storage::*;
pub use store::*;
pub use transfer::*;
