//! Checksum utilities for artifact integrity and cache invalidation

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// Hex-encoded SHA256 digest
///
/// Used both to verify published schema documents against the checksum
/// recorded in the manifest and as the cache key for manifest contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Compute a checksum over raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute a checksum over a JSON document in canonical (compact) form
    ///
    /// Publishing tools record checksums over the compact serialization, so
    /// verification must use the same form regardless of how the artifact is
    /// formatted on disk.
    pub fn from_document(value: &serde_json::Value) -> Self {
        let canonical = serde_json::to_string(value).unwrap_or_default();
        Self::from_bytes(canonical.as_bytes())
    }

    /// Compute a checksum over a file's contents
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Hex digest string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a JSON document against this checksum
    pub fn matches_document(&self, value: &serde_json::Value) -> bool {
        *self == Self::from_document(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Checksum {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
