//! Version key handling
//!
//! Manifest version keys are plain semver strings (`"1.0.0"`). This crate
//! never mints versions; it only parses keys for ordering and display, so the
//! wrapper stays deliberately small.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed manifest version key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(Version);

impl SchemaVersion {
    /// Parse a version key, tolerating a leading `v`
    pub fn parse(key: &str) -> Result<Self, semver::Error> {
        let key = key.strip_prefix('v').unwrap_or(key);
        Ok(Self(Version::parse(key)?))
    }

    /// The bare version string (`"1.2.3"`)
    pub fn version_string(&self) -> String {
        self.0.to_string()
    }

    /// The tagged form (`"v1.2.3"`)
    pub fn tag_string(&self) -> String {
        format!("v{}", self.0)
    }

    /// Whether this version corresponds to the given manifest key
    pub fn matches_key(&self, key: &str) -> bool {
        key.strip_prefix('v').unwrap_or(key) == self.version_string()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}
