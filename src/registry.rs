//! Schema Registry
//!
//! Resolves a content-addressed registry of published schema versions: the
//! manifest names every (schema, version) pair, and hydration loads each
//! pair's artifacts from disk. Hydration failures are isolated per version
//! and recorded on the entry rather than raised.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::checksum::Checksum;
use crate::error::{RegistryError, Result};
use crate::manifest::{ManifestIssue, RegistryManifest};

/// Why a version's artifacts could not be hydrated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationFailure {
    /// Artifact file does not exist
    MissingArtifact { path: PathBuf },
    /// Artifact file exists but could not be read
    Unreadable { path: PathBuf, detail: String },
    /// Artifact file is not valid JSON
    InvalidJson { path: PathBuf, detail: String },
}

impl std::fmt::Display for HydrationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HydrationFailure::MissingArtifact { path } => {
                write!(f, "missing artifact: {}", path.display())
            }
            HydrationFailure::Unreadable { path, detail } => {
                write!(f, "unreadable artifact {}: {}", path.display(), detail)
            }
            HydrationFailure::InvalidJson { path, detail } => {
                write!(f, "invalid JSON in {}: {}", path.display(), detail)
            }
        }
    }
}

/// Outcome of hydrating one published version
///
/// An entry is `Loaded` only when both artifacts parsed; any failure leaves
/// the entry present but `Failed`, so callers can always distinguish "never
/// published" (absent key) from "published but broken" (failed entry).
#[derive(Debug, Clone)]
pub enum Hydration {
    Loaded { schema: Value, meta: Value },
    Failed { reason: HydrationFailure },
}

/// A manifest entry carried through hydration
#[derive(Debug, Clone)]
pub struct HydratedEntry {
    /// Content address of the pinned artifact
    pub cid: String,
    /// Checksum recorded at publish time
    pub checksum: Checksum,
    /// Publish time, seconds since the Unix epoch
    pub timestamp: i64,
    /// Relative artifact path recorded at publish time
    pub schema_path: String,
    /// Load outcome for this version's artifacts
    pub hydration: Hydration,
}

impl HydratedEntry {
    /// The parsed schema document, if hydration succeeded
    pub fn schema(&self) -> Option<&Value> {
        match &self.hydration {
            Hydration::Loaded { schema, .. } => Some(schema),
            Hydration::Failed { .. } => None,
        }
    }

    /// The parsed metadata document, if hydration succeeded
    pub fn meta(&self) -> Option<&Value> {
        match &self.hydration {
            Hydration::Loaded { meta, .. } => Some(meta),
            Hydration::Failed { .. } => None,
        }
    }

    /// Whether both artifacts loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self.hydration, Hydration::Loaded { .. })
    }

    /// The failure reason, if hydration failed
    pub fn failure(&self) -> Option<&HydrationFailure> {
        match &self.hydration {
            Hydration::Failed { reason } => Some(reason),
            Hydration::Loaded { .. } => None,
        }
    }
}

/// All hydrated versions of one schema identifier
#[derive(Debug, Clone)]
pub struct HydratedSet {
    /// Version key the manifest recommends as default
    pub latest: String,
    /// Hydrated entries, keyed by version string
    pub versions: BTreeMap<String, HydratedEntry>,
}

/// The fully-hydrated registry
///
/// Contains exactly the (schema, version) keys of the manifest it was built
/// from, whatever the individual load outcomes.
#[derive(Debug, Clone)]
pub struct HydratedRegistry {
    root: PathBuf,
    /// Hydrated version sets keyed by schema identifier
    pub schemas: BTreeMap<String, HydratedSet>,
}

/// The main schema registry
#[derive(Debug)]
pub struct SchemaRegistry {
    /// Registry root directory
    root: PathBuf,
    /// Parsed manifest
    manifest: RegistryManifest,
}

impl SchemaRegistry {
    /// Open a registry rooted at the given directory
    ///
    /// Loads and parses `_registry.json`; a missing or malformed manifest is
    /// fatal. Structural issues (stale latest pointers and the like) are
    /// logged but do not prevent opening.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let manifest = RegistryManifest::load(&root)?;

        for issue in manifest.validate() {
            tracing::warn!(%issue, "manifest issue");
        }

        Ok(Self { root, manifest })
    }

    /// Registry root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The parsed manifest
    pub fn manifest(&self) -> &RegistryManifest {
        &self.manifest
    }

    /// Structural issues in the manifest
    pub fn manifest_issues(&self) -> Vec<ManifestIssue> {
        self.manifest.validate()
    }

    /// Hydrate every published version
    ///
    /// Loads `schema.json` and `meta.json` for each (schema, version) pair in
    /// a single deterministic pass. Every manifest key appears in the output;
    /// a load failure marks its own entry `Failed` and touches nothing else.
    /// Each call builds an independent structure; see
    /// [`crate::cache::CachedResolver`] for reuse across calls.
    pub fn resolve(&self) -> HydratedRegistry {
        let mut schemas = BTreeMap::new();

        for (schema_id, set) in &self.manifest.schemas {
            let mut versions = BTreeMap::new();

            for (version, entry) in &set.published {
                let dir = self.manifest.artifact_dir(&self.root, schema_id, version);
                let hydration = match hydrate_version(&dir) {
                    Ok((schema, meta)) => Hydration::Loaded { schema, meta },
                    Err(reason) => {
                        tracing::warn!(
                            schema_id = %schema_id,
                            version = %version,
                            %reason,
                            "artifact hydration failed"
                        );
                        Hydration::Failed { reason }
                    }
                };

                versions.insert(
                    version.clone(),
                    HydratedEntry {
                        cid: entry.cid.clone(),
                        checksum: entry.checksum.clone(),
                        timestamp: entry.timestamp,
                        schema_path: entry.schema_path.clone(),
                        hydration,
                    },
                );
            }

            schemas.insert(
                schema_id.clone(),
                HydratedSet {
                    latest: set.latest.clone(),
                    versions,
                },
            );
        }

        HydratedRegistry {
            root: self.root.clone(),
            schemas,
        }
    }
}

/// Load both artifacts for one version directory
fn hydrate_version(dir: &Path) -> std::result::Result<(Value, Value), HydrationFailure> {
    let schema = load_artifact(&dir.join("schema.json"))?;
    let meta = load_artifact(&dir.join("meta.json"))?;
    Ok((schema, meta))
}

fn load_artifact(path: &Path) -> std::result::Result<Value, HydrationFailure> {
    if !path.exists() {
        return Err(HydrationFailure::MissingArtifact {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| HydrationFailure::Unreadable {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| HydrationFailure::InvalidJson {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

impl HydratedRegistry {
    /// Registry root this structure was hydrated from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up one hydrated entry
    pub fn get(&self, schema_id: &str, version: &str) -> Option<&HydratedEntry> {
        self.schemas.get(schema_id)?.versions.get(version)
    }

    /// Iterate all entries as (schema_id, version, entry)
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &HydratedEntry)> {
        self.schemas.iter().flat_map(|(schema_id, set)| {
            set.versions
                .iter()
                .map(move |(version, entry)| (schema_id.as_str(), version.as_str(), entry))
        })
    }

    /// Number of entries whose artifacts loaded
    pub fn loaded_count(&self) -> usize {
        self.entries().filter(|(_, _, e)| e.is_loaded()).count()
    }

    /// Number of entries whose artifacts failed to load
    pub fn failed_count(&self) -> usize {
        self.entries().filter(|(_, _, e)| !e.is_loaded()).count()
    }

    /// Verify one loaded entry against its recorded checksum
    ///
    /// The checksum covers the canonical (compact) serialization of the
    /// schema document. Entries that failed hydration cannot be verified and
    /// report as not found.
    pub fn verify(&self, schema_id: &str, version: &str) -> Result<()> {
        let entry = self
            .get(schema_id, version)
            .ok_or_else(|| RegistryError::NotFound {
                name: schema_id.to_string(),
                version: version.to_string(),
            })?;
        let schema = entry.schema().ok_or_else(|| RegistryError::NotFound {
            name: schema_id.to_string(),
            version: version.to_string(),
        })?;

        let actual = Checksum::from_document(schema);
        if actual != entry.checksum {
            return Err(RegistryError::ChecksumMismatch {
                name: schema_id.to_string(),
                version: version.to_string(),
                expected: entry.checksum.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }

    /// Verify every loaded entry; returns the mismatches
    ///
    /// Entries that failed hydration are skipped (their status is already
    /// visible on the entry itself).
    pub fn verify_all(&self) -> Vec<RegistryError> {
        let mut failures = Vec::new();
        for (schema_id, version, entry) in self.entries() {
            if entry.is_loaded() {
                if let Err(e) = self.verify(schema_id, version) {
                    failures.push(e);
                }
            }
        }
        failures
    }

    /// Write one hydrated version's artifacts to a directory
    pub fn export(
        &self,
        schema_id: &str,
        version: &str,
        output_dir: impl AsRef<Path>,
        include_meta: bool,
    ) -> Result<()> {
        let entry = self
            .get(schema_id, version)
            .ok_or_else(|| RegistryError::NotFound {
                name: schema_id.to_string(),
                version: version.to_string(),
            })?;
        let (schema, meta) = match &entry.hydration {
            Hydration::Loaded { schema, meta } => (schema, meta),
            Hydration::Failed { .. } => {
                return Err(RegistryError::NotFound {
                    name: schema_id.to_string(),
                    version: version.to_string(),
                })
            }
        };

        let output = output_dir.as_ref();
        fs::create_dir_all(output)?;
        fs::write(
            output.join("schema.json"),
            serde_json::to_string_pretty(schema)?,
        )?;
        if include_meta {
            fs::write(output.join("meta.json"), serde_json::to_string_pretty(meta)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_version(root: &Path, schema_id: &str, version: &str, schema: &str, meta: &str) {
        let dir = root.join(schema_id).join("versions").join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("schema.json"), schema).unwrap();
        fs::write(dir.join("meta.json"), meta).unwrap();
    }

    fn write_manifest(root: &Path, body: &str) {
        fs::write(root.join("_registry.json"), body).unwrap();
    }

    #[test]
    fn test_open_without_manifest() {
        let dir = tempdir().unwrap();
        let err = SchemaRegistry::open(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::ManifestMissing { .. }));
    }

    #[test]
    fn test_resolve_hydrates_artifacts() {
        let dir = tempdir().unwrap();
        write_manifest(
            dir.path(),
            r#"{
                "agent": {
                    "latest": "1.0.0",
                    "published": {
                        "1.0.0": {
                            "cid": "bafyagent100",
                            "checksum": "abc",
                            "timestamp": 1700000000,
                            "schemaPath": "agent/versions/1.0.0/schema.json"
                        }
                    }
                }
            }"#,
        );
        write_version(
            dir.path(),
            "agent",
            "1.0.0",
            r#"{"title": "Agent", "type": "object"}"#,
            r#"{"publisher": "agentry"}"#,
        );

        let registry = SchemaRegistry::open(dir.path()).unwrap();
        let hydrated = registry.resolve();

        let entry = hydrated.get("agent", "1.0.0").unwrap();
        assert!(entry.is_loaded());
        assert_eq!(entry.schema().unwrap()["title"], "Agent");
        assert_eq!(entry.meta().unwrap()["publisher"], "agentry");
    }

    #[test]
    fn test_missing_meta_fails_entry() {
        let dir = tempdir().unwrap();
        write_manifest(
            dir.path(),
            r#"{
                "agent": {
                    "latest": "1.0.0",
                    "published": {
                        "1.0.0": {
                            "cid": "bafyagent100",
                            "checksum": "abc",
                            "timestamp": 1700000000,
                            "schemaPath": "agent/versions/1.0.0/schema.json"
                        }
                    }
                }
            }"#,
        );
        let version_dir = dir.path().join("agent/versions/1.0.0");
        fs::create_dir_all(&version_dir).unwrap();
        fs::write(version_dir.join("schema.json"), r#"{"title": "Agent"}"#).unwrap();

        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        let entry = hydrated.get("agent", "1.0.0").unwrap();
        assert!(!entry.is_loaded());
        assert!(matches!(
            entry.failure(),
            Some(HydrationFailure::MissingArtifact { .. })
        ));
    }

    #[test]
    fn test_key_set_preserved_on_failure() {
        let dir = tempdir().unwrap();
        write_manifest(
            dir.path(),
            r#"{
                "agent": {
                    "latest": "1.1.0",
                    "published": {
                        "1.0.0": {
                            "cid": "bafyagent100",
                            "checksum": "abc",
                            "timestamp": 1700000000,
                            "schemaPath": "agent/versions/1.0.0/schema.json"
                        },
                        "1.1.0": {
                            "cid": "bafyagent110",
                            "checksum": "def",
                            "timestamp": 1700001000,
                            "schemaPath": "agent/versions/1.1.0/schema.json"
                        }
                    }
                }
            }"#,
        );
        // Only 1.1.0 has artifacts on disk.
        write_version(dir.path(), "agent", "1.1.0", r#"{"title": "Agent"}"#, "{}");

        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        assert!(hydrated.get("agent", "1.0.0").is_some());
        assert!(hydrated.get("agent", "1.1.0").is_some());
        assert_eq!(hydrated.loaded_count(), 1);
        assert_eq!(hydrated.failed_count(), 1);
    }

    #[test]
    fn test_verify_detects_tampering() {
        let dir = tempdir().unwrap();
        let schema = serde_json::json!({"title": "Agent", "type": "object"});
        let checksum = Checksum::from_document(&schema);
        write_manifest(
            dir.path(),
            &format!(
                r#"{{
                    "agent": {{
                        "latest": "1.0.0",
                        "published": {{
                            "1.0.0": {{
                                "cid": "bafyagent100",
                                "checksum": "{}",
                                "timestamp": 1700000000,
                                "schemaPath": "agent/versions/1.0.0/schema.json"
                            }}
                        }}
                    }}
                }}"#,
                checksum
            ),
        );
        write_version(
            dir.path(),
            "agent",
            "1.0.0",
            &serde_json::to_string(&schema).unwrap(),
            "{}",
        );

        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        assert!(hydrated.verify("agent", "1.0.0").is_ok());
        assert!(hydrated.verify_all().is_empty());

        // Tamper with the artifact and re-resolve.
        write_version(
            dir.path(),
            "agent",
            "1.0.0",
            r#"{"title": "Tampered"}"#,
            "{}",
        );
        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        assert!(matches!(
            hydrated.verify("agent", "1.0.0"),
            Err(RegistryError::ChecksumMismatch { .. })
        ));
        assert_eq!(hydrated.verify_all().len(), 1);
    }
}
