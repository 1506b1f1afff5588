//! Local persistence.
//!
//! The client is deliberately almost stateless across reloads: the only
//! durable core state is the current analytics session id, held in a small
//! kv table. Configuration lives in a TOML file next to it.

pub mod config;
pub mod database;

pub use config::{AudioConfig, Config, ServiceConfig, TimingConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::StorageError;

/// Data directory at `~/.config/soulscent`, created on first use.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = dirs::config_dir()
        .ok_or_else(|| StorageError::DataDir("no platform config directory".into()))?
        .join("soulscent");
    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
