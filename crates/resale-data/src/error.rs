//! # Data Error Types
//!
//! Failures while reading master data or the pricing configuration.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Data Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   File Access   │  │     Parsing     │  │     Content             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Io             │  │  Json           │  │  Validation             │ │
//! │  │  NoConfigPath   │  │  TomlDe/TomlSer │  │  InvalidConfig          │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use resale_core::ValidationError;
use thiserror::Error;

/// Result type alias for data operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors from loading master data and configuration.
#[derive(Debug, Error)]
pub enum DataError {
    // =========================================================================
    // File Access
    // =========================================================================
    /// Reading or writing a file failed.
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `--config` path was given and the platform has no config dir.
    #[error("No config path available")]
    NoConfigPath,

    // =========================================================================
    // Parsing
    // =========================================================================
    /// A master data file is not valid JSON of the expected shape.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The config file is not valid TOML.
    #[error("Failed to parse config: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// The config could not be written as TOML.
    #[error("Failed to serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),

    // =========================================================================
    // Content
    // =========================================================================
    /// Master data parsed but breaks a rule (duplicate label, fee > 100 %...).
    #[error("Invalid master data in {path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// A config value is out of range.
    #[error("Invalid pricing configuration: {0}")]
    InvalidConfig(String),
}

impl DataError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        DataError::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn validation(path: &Path, source: ValidationError) -> Self {
        DataError::Validation {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DataError::TomlDe(_) | DataError::InvalidConfig(_) | DataError::NoConfigPath
        )
    }
}
