//! Registry manifest types
//!
//! The on-disk manifest (`_registry.json`) maps each schema identifier to its
//! set of published versions plus a `latest` pointer. The manifest describes
//! where artifacts live; it never embeds the artifacts themselves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::checksum::Checksum;
use crate::error::{RegistryError, Result};
use crate::version::SchemaVersion;

/// Default manifest file name at the registry root
pub const MANIFEST_FILE: &str = "_registry.json";

/// A single published version of a schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEntry {
    /// Content address of the pinned artifact (IPFS CID)
    pub cid: String,
    /// SHA256 checksum of the canonical schema document
    pub checksum: Checksum,
    /// Publish time, seconds since the Unix epoch
    pub timestamp: i64,
    /// Relative artifact path recorded at publish time
    pub schema_path: String,
}

/// All published versions of one schema identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionSet {
    /// Version key the identifier currently recommends as default
    pub latest: String,
    /// Published versions, keyed by version string
    pub published: BTreeMap<String, PublishedEntry>,
}

impl VersionSet {
    /// Whether the `latest` pointer names a published version
    pub fn latest_is_published(&self) -> bool {
        self.published.contains_key(&self.latest)
    }
}

/// A problem detected in a manifest
///
/// Issues are reported, not raised: a manifest with issues still resolves,
/// with the documented degraded behavior (e.g. a stale `latest` pointer means
/// no version of that schema is marked latest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestIssue {
    /// `latest` names a version absent from `published`
    StaleLatestPointer { schema_id: String, latest: String },
    /// A schema identifier with no published versions
    EmptyVersionSet { schema_id: String },
    /// A version key that is not valid semver
    UnparseableVersion { schema_id: String, version: String },
}

impl std::fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestIssue::StaleLatestPointer { schema_id, latest } => write!(
                f,
                "{}: latest pointer '{}' names no published version",
                schema_id, latest
            ),
            ManifestIssue::EmptyVersionSet { schema_id } => {
                write!(f, "{}: no published versions", schema_id)
            }
            ManifestIssue::UnparseableVersion { schema_id, version } => {
                write!(f, "{}: version key '{}' is not semver", schema_id, version)
            }
        }
    }
}

/// The parsed registry manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryManifest {
    /// Version sets keyed by schema identifier
    #[serde(flatten)]
    pub schemas: BTreeMap<String, VersionSet>,
}

impl RegistryManifest {
    /// Load the manifest from a registry root directory
    ///
    /// A missing file is fatal (there is no registry to serve); so is a
    /// manifest that does not parse.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_file(&root.join(MANIFEST_FILE))
    }

    /// Load the manifest from an explicit file path
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RegistryError::ManifestMissing {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| RegistryError::ManifestInvalid {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// All schema identifiers, in deterministic order
    pub fn schema_ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Look up one schema's version set
    pub fn get(&self, schema_id: &str) -> Option<&VersionSet> {
        self.schemas.get(schema_id)
    }

    /// Total number of (schema, version) pairs
    pub fn entry_count(&self) -> usize {
        self.schemas.values().map(|s| s.published.len()).sum()
    }

    /// Directory holding one version's artifacts, relative to the registry root
    ///
    /// Layout: `{schemaId}/versions/{version}/` containing `schema.json` and
    /// `meta.json`. Derived deterministically; the manifest's `schemaPath` is
    /// informational and carried through untouched.
    pub fn artifact_dir(&self, root: &Path, schema_id: &str, version: &str) -> PathBuf {
        root.join(schema_id).join("versions").join(version)
    }

    /// Scan the manifest for structural issues
    ///
    /// Issues never abort resolution; stale `latest` pointers in particular
    /// keep the documented behavior of marking no version as latest. Logging
    /// is left to the caller so repeated scans stay quiet.
    pub fn validate(&self) -> Vec<ManifestIssue> {
        let mut issues = Vec::new();
        for (schema_id, set) in &self.schemas {
            if set.published.is_empty() {
                issues.push(ManifestIssue::EmptyVersionSet {
                    schema_id: schema_id.clone(),
                });
                continue;
            }
            if !set.latest_is_published() {
                issues.push(ManifestIssue::StaleLatestPointer {
                    schema_id: schema_id.clone(),
                    latest: set.latest.clone(),
                });
            }
            for version in set.published.keys() {
                if SchemaVersion::parse(version).is_err() {
                    issues.push(ManifestIssue::UnparseableVersion {
                        schema_id: schema_id.clone(),
                        version: version.clone(),
                    });
                }
            }
        }
        issues
    }
}
