//! Agentry Schema Registry
//!
//! A content-addressed, versioned registry of JSON Schema bundles for agent
//! registration and organizational metadata.
//!
//! ## Features
//!
//! - **Content Addressing**: every published version is pinned by CID and
//!   SHA256 checksum
//! - **Failure Isolation**: a broken artifact never hides its siblings;
//!   hydration outcomes are tagged per version
//! - **Explicit Caching**: opt-in memoization keyed on manifest content
//! - **Instance Validation**: registration documents validated against
//!   resolved schemas
//!
//! ## Registry layout
//!
//! ```text
//! registry/
//! ├── _registry.json
//! ├── agent/
//! │   └── versions/
//! │       ├── 1.0.0/
//! │       │   ├── schema.json
//! │       │   └── meta.json
//! │       └── 1.1.0/
//! └── org/
//!     └── versions/
//!         └── 1.0.0/
//! ```

pub mod cache;
pub mod catalog;
pub mod checksum;
pub mod compat;
pub mod config;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod validate;
pub mod version;

pub use cache::CachedResolver;
pub use catalog::{Catalog, SchemaRecord};
pub use checksum::Checksum;
pub use error::{RegistryError, Result};
pub use manifest::{ManifestIssue, PublishedEntry, RegistryManifest, VersionSet};
pub use registry::{Hydration, HydrationFailure, HydratedEntry, HydratedRegistry, SchemaRegistry};
pub use version::SchemaVersion;
