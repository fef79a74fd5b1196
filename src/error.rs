//! Error types for the schema registry

use std::path::PathBuf;
use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Schema registry errors
///
/// Per-version artifact load failures are deliberately NOT represented here:
/// they are recorded on the hydrated entry itself (see
/// [`crate::registry::Hydration`]) and never propagate as errors. Lookup
/// misses are `Option`, not errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry manifest not found at {path}")]
    ManifestMissing { path: PathBuf },

    #[error("registry manifest at {path} is not valid JSON: {detail}")]
    ManifestInvalid { path: PathBuf, detail: String },

    #[error("schema not found: {name} version {version}")]
    NotFound { name: String, version: String },

    #[error("checksum mismatch for {name} v{version}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        version: String,
        expected: String,
        actual: String,
    },

    #[error("invalid schema document: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
