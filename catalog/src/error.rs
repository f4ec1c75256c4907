//! Error types for collection loading and workspace configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading collection manifests or schema documents.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The manifest parsed but is not usable.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// A shared schema document could not be loaded.
    #[error("schema document {}: {detail}", path.display())]
    SchemaDocument { path: PathBuf, detail: String },
}

/// Errors raised while reading or writing the workspace configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for manifest results.
pub type Result<T> = std::result::Result<T, ManifestError>;
