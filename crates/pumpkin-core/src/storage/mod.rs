mod config;
pub mod database;
pub mod gateway;
mod memory;

pub use config::{AlarmDefaults, Config, CountdownConfig, ExportConfig, ImportConfig, NotificationsConfig};
pub use database::Database;
pub use gateway::{keys, Persistence};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// A string key-value store: one entry per persisted field.
pub trait KvStore {
    /// Get a value, `None` if the key was never written.
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn kv_set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns the data directory, creating it if needed.
///
/// `PUMPKIN_BINGO_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/pumpkin-bingo[-dev]/`, with the `-dev` suffix when
/// `PUMPKIN_BINGO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("PUMPKIN_BINGO_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("PUMPKIN_BINGO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pumpkin-bingo-dev")
            } else {
                base_dir.join("pumpkin-bingo")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
