//! Core error types for soulscent-core.
//!
//! This module defines the error hierarchy using thiserror. Note that most
//! runtime failures in this system are deliberately *not* errors at the API
//! surface: playback rejections, telemetry failures, and collaborator
//! faults are swallowed at their boundary and logged (see the module docs
//! of `audio`, `analytics`, and `collaborators`). The types here cover the
//! paths where a caller can actually act on the failure.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for soulscent-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Playback-related errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Telemetry-related errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// A collaborator endpoint URL could not be parsed
    #[error("Invalid endpoint '{url}': {message}")]
    Endpoint { url: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Playback-specific errors.
///
/// These never cross the orchestrator boundary -- `AudioChannel` absorbs
/// them -- but sink implementations need a vocabulary for what went wrong.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Play request refused by the platform (autoplay policy, permissions).
    #[error("play request rejected: {0}")]
    Rejected(String),

    /// The source could not be loaded or decoded.
    #[error("failed to load source '{url}': {message}")]
    SourceFailed { url: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No usable data directory on this platform
    #[error("No data directory available: {0}")]
    DataDir(String),
}

/// Telemetry-specific errors.
///
/// Only surfaced by the explicit async send path; the fire-and-forget
/// `Telemetry` trait methods log and swallow these.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Request could not be sent
    #[error("request failed: {0}")]
    Request(String),

    /// Backend answered with a non-success status
    #[error("backend returned HTTP {0}")]
    Status(u16),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

impl From<reqwest::Error> for TelemetryError {
    fn from(err: reqwest::Error) -> Self {
        TelemetryError::Request(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
