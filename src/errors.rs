//! Error types for OSM Power Fetcher
//!
//! This module defines the error types for every component of the application.
//! Errors are grouped by concern so that the acquisition pipelines can decide at the
//! narrowest useful boundary whether a failure is per-artifact, per-country or
//! per-batch.

use std::path::PathBuf;
use thiserror::Error;

/// Download and HTTP client errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// File already exists and overwriting was not allowed
    #[error("File already exists: {path}")]
    FileExists { path: String },

    /// I/O error during file operations
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Resource does not exist upstream
    #[error("Not found upstream: {url}")]
    NotFound { url: String },

    /// Server returned error status
    #[error("Server error: HTTP {status} for {url}")]
    ServerError { status: u16, url: String },

    /// Downloaded file does not match the published checksum
    #[error("File hash mismatch for {path}. Expected: {expected}, got: {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Checksum file content could not be parsed
    #[error("Invalid checksum file content: {content:?}")]
    InvalidChecksum { content: String },

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// The primitive reported success but nothing is on disk
    #[error("Downloaded file missing on disk: {path}")]
    MissingOnDisk { path: PathBuf },

    /// Generic error for other issues
    #[error("{0}")]
    Other(String),
}

/// Region resolution errors
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Region index could not be fetched
    #[error("Failed to fetch region index: {0}")]
    Download(#[from] DownloadError),

    /// Region index is not valid JSON in the expected shape
    #[error("Failed to parse region index: {0}")]
    IndexParse(#[from] serde_json::Error),

    /// Local region index could not be read
    #[error("Failed to read region index {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Region name is not in the index
    #[error("Unknown region: {name}")]
    UnknownRegion { name: String },
}

/// Snapshot date and URL derivation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Date string is not YYYY-MM-DD
    #[error("Invalid date format: {value}. Expected YYYY-MM-DD")]
    InvalidDateFormat { value: String },

    /// URL could not be parsed
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// URL file name does not carry the suffix that is being rewritten
    #[error("URL {url} does not end with {expected}")]
    UnexpectedSuffix { url: String, expected: String },
}

/// Bulk extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Extraction tool is not installed
    #[error("Extraction tool not found: {name}. Install earth-osm or set EARTH_OSM_BIN")]
    BinaryNotFound { name: String },

    /// Extraction tool could not be started
    #[error("Failed to execute {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        source: std::io::Error,
    },

    /// Extraction tool exited unsuccessfully
    #[error("Extraction failed with exit status {status}")]
    Failed { status: String },

    /// Extraction tool reported a failure of its own
    #[error("Extraction failed: {0}")]
    Other(String),
}

/// Output reconciliation errors
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Filesystem operation failed
    #[error("Reconciliation I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read or written
    #[error("Configuration file I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid TOML configuration
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid orchestrator parameters
    #[error("Invalid orchestrator parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),

    /// Configuration could not be rendered
    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Region resolution error
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Snapshot error
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Extraction error
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Reconciliation error
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Resolve(_) => "resolution",
            AppError::Snapshot(_) => "format",
            AppError::Extract(_) => "extraction",
            AppError::Reconcile(_) => "reconcile",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Region resolution result type alias
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Snapshot result type alias
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Extraction result type alias
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Reconciliation result type alias
pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
