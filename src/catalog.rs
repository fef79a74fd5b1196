//! Consumer-facing schema catalog
//!
//! Projects a hydrated registry into flat records the way downstream tooling
//! consumes them: one record per successfully loaded (schema, version) pair,
//! addressed by content id. Failed entries stay visible on the hydrated
//! registry but never appear in listings.

use chrono::{DateTime, Utc};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;
use serde_json::Value;

use crate::checksum::Checksum;
use crate::registry::HydratedRegistry;
use crate::version::SchemaVersion;

/// One published schema version, flattened for consumers
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRecord {
    /// Content-derived identifier (`ipfs://{cid}`)
    pub id: String,
    /// Composite display title (`{schemaId}-v{version}`)
    pub title: String,
    /// Display class, taken from the schema document's `title` field
    pub class: String,
    /// Schema identifier this record belongs to
    pub schema_id: String,
    /// Version key
    pub version: String,
    /// Content address of the pinned artifact
    pub cid: String,
    /// Checksum recorded at publish time
    pub checksum: Checksum,
    /// Publish time
    pub timestamp: DateTime<Utc>,
    /// Whether this version is the schema's current default
    pub is_latest: bool,
    /// The parsed schema document
    pub schema: Value,
    /// The parsed metadata document
    pub meta: Value,
}

/// Lookup API over a hydrated registry
///
/// All lookups are linear scans; registries hold tens of entries, not
/// thousands, and no index is worth maintaining at that size.
pub struct Catalog {
    records: Vec<SchemaRecord>,
    matcher: SkimMatcherV2,
}

impl Catalog {
    /// Build the catalog from a hydrated registry
    ///
    /// A version is marked latest when its key equals the manifest's `latest`
    /// pointer; a stale pointer therefore marks nothing.
    pub fn new(registry: &HydratedRegistry) -> Self {
        let mut records = Vec::new();

        for (schema_id, set) in &registry.schemas {
            for (version, entry) in &set.versions {
                let (schema, meta) = match (entry.schema(), entry.meta()) {
                    (Some(schema), Some(meta)) => (schema.clone(), meta.clone()),
                    _ => continue,
                };

                let class = schema
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(schema_id)
                    .to_string();

                records.push(SchemaRecord {
                    id: format!("ipfs://{}", entry.cid),
                    title: format!("{}-v{}", schema_id, version),
                    class,
                    schema_id: schema_id.clone(),
                    version: version.clone(),
                    cid: entry.cid.clone(),
                    checksum: entry.checksum.clone(),
                    timestamp: DateTime::from_timestamp(entry.timestamp, 0).unwrap_or_default(),
                    is_latest: *version == set.latest,
                    schema,
                    meta,
                });
            }
        }

        // BTreeMap iteration orders version keys lexicographically, which
        // mis-sorts "1.10.0" before "1.2.0"; listings use semver order.
        records.sort_by(|a, b| {
            a.schema_id.cmp(&b.schema_id).then_with(|| {
                match (
                    SchemaVersion::parse(&a.version),
                    SchemaVersion::parse(&b.version),
                ) {
                    (Ok(va), Ok(vb)) => va.cmp(&vb),
                    _ => a.version.cmp(&b.version),
                }
            })
        });

        Self {
            records,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// All successfully hydrated records
    pub fn list(&self) -> &[SchemaRecord] {
        &self.records
    }

    /// Exact lookup by content-derived id (`ipfs://{cid}`)
    pub fn get_by_id(&self, id: &str) -> Option<&SchemaRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// The latest published version with the given display class
    pub fn latest_by_class(&self, class: &str) -> Option<&SchemaRecord> {
        self.records
            .iter()
            .find(|r| r.class == class && r.is_latest)
    }

    /// The latest published version of a schema identifier
    pub fn latest_by_schema_id(&self, schema_id: &str) -> Option<&SchemaRecord> {
        self.records
            .iter()
            .find(|r| r.schema_id == schema_id && r.is_latest)
    }

    /// Best fuzzy match for a class or schema identifier
    ///
    /// Used for "did you mean" output on lookup misses.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        self.records
            .iter()
            .flat_map(|r| [r.class.as_str(), r.schema_id.as_str()])
            .filter_map(|candidate| {
                self.matcher
                    .fuzzy_match(candidate, name)
                    .map(|score| (score, candidate))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, candidate)| candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaRegistry;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_version(root: &Path, schema_id: &str, version: &str, schema: &str) {
        let dir = root.join(schema_id).join("versions").join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("schema.json"), schema).unwrap();
        fs::write(dir.join("meta.json"), r#"{"publisher": "agentry"}"#).unwrap();
    }

    fn two_version_registry() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("_registry.json"),
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
        )
        .unwrap();
        write_version(dir.path(), "agent", "1.0.0", r#"{"title": "Agent"}"#);
        write_version(dir.path(), "agent", "1.1.0", r#"{"title": "Agent"}"#);
        dir
    }

    #[test]
    fn test_list_and_latest_flags() {
        let dir = two_version_registry();
        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        let catalog = Catalog::new(&hydrated);

        assert_eq!(catalog.list().len(), 2);
        let latest: Vec<_> = catalog.list().iter().filter(|r| r.is_latest).collect();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].version, "1.1.0");
        assert_eq!(latest[0].title, "agent-v1.1.0");
        assert_eq!(latest[0].class, "Agent");
    }

    #[test]
    fn test_get_by_id() {
        let dir = two_version_registry();
        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        let catalog = Catalog::new(&hydrated);

        let record = catalog.get_by_id("ipfs://bafyagent100").unwrap();
        assert_eq!(record.version, "1.0.0");
        assert!(catalog.get_by_id("ipfs://unknown").is_none());
    }

    #[test]
    fn test_latest_by_class() {
        let dir = two_version_registry();
        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        let catalog = Catalog::new(&hydrated);

        let record = catalog.latest_by_class("Agent").unwrap();
        assert_eq!(record.version, "1.1.0");
        assert!(catalog.latest_by_class("Unknown").is_none());
    }

    #[test]
    fn test_class_falls_back_to_schema_id() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("_registry.json"),
            r#"{
                "org": {
                    "latest": "1.0.0",
                    "published": {
                        "1.0.0": {
                            "cid": "bafyorg1",
                            "checksum": "abc",
                            "timestamp": 1700000000,
                            "schemaPath": "org/versions/1.0.0/schema.json"
                        }
                    }
                }
            }"#,
        )
        .unwrap();
        write_version(dir.path(), "org", "1.0.0", r#"{"type": "object"}"#);

        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        let catalog = Catalog::new(&hydrated);
        assert_eq!(catalog.list()[0].class, "org");
    }

    #[test]
    fn test_semver_ordering_in_listing() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("_registry.json"),
            r#"{
                "agent": {
                    "latest": "1.10.0",
                    "published": {
                        "1.2.0": {
                            "cid": "bafyagent120",
                            "checksum": "abc",
                            "timestamp": 1700000000,
                            "schemaPath": "agent/versions/1.2.0/schema.json"
                        },
                        "1.10.0": {
                            "cid": "bafyagent1100",
                            "checksum": "def",
                            "timestamp": 1700002000,
                            "schemaPath": "agent/versions/1.10.0/schema.json"
                        }
                    }
                }
            }"#,
        )
        .unwrap();
        write_version(dir.path(), "agent", "1.2.0", r#"{"title": "Agent"}"#);
        write_version(dir.path(), "agent", "1.10.0", r#"{"title": "Agent"}"#);

        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        let catalog = Catalog::new(&hydrated);

        let versions: Vec<_> = catalog.list().iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["1.2.0", "1.10.0"]);
    }

    #[test]
    fn test_suggest() {
        let dir = two_version_registry();
        let hydrated = SchemaRegistry::open(dir.path()).unwrap().resolve();
        let catalog = Catalog::new(&hydrated);

        let suggestion = catalog.suggest("agnt").unwrap();
        assert!(suggestion.eq_ignore_ascii_case("agent"));
        assert!(catalog.suggest("zzz").is_none());
    }
}
