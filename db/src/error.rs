//! Error types for catalog operations.
//!
//! Covers every way loading can fail: I/O, JSON or YAML parsing, unsupported
//! document formats and empty fallback chains. Validation findings are not
//! errors; they are reported through [`CatalogReport`](crate::CatalogReport).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading package documents or configuration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension is not one of `json`, `yml` or `yaml`.
    #[error("unsupported document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Two documents declare a package list with the same name.
    #[error("duplicate package list: {0}")]
    DuplicateList(String),

    /// All configured loader sources failed.
    #[error("no package sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;
