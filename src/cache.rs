//! Memoized registry resolution
//!
//! [`crate::registry::SchemaRegistry::resolve`] rebuilds the hydrated
//! registry on every call. `CachedResolver` wraps that with explicit
//! memoization keyed on the manifest's content checksum: artifacts are only
//! re-hydrated when the manifest bytes actually changed. It is a plain value
//! owned by the caller, not process-global state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::checksum::Checksum;
use crate::error::{RegistryError, Result};
use crate::manifest::MANIFEST_FILE;
use crate::registry::{HydratedRegistry, SchemaRegistry};

/// A resolver that reuses the hydrated registry across calls
pub struct CachedResolver {
    root: PathBuf,
    cached: Option<(Checksum, Arc<HydratedRegistry>)>,
}

impl CachedResolver {
    /// Create a resolver for the given registry root
    ///
    /// Nothing is read until the first access.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cached: None,
        }
    }

    /// The hydrated registry, re-resolving only if the manifest changed
    ///
    /// Each access re-reads and re-checksums only the manifest file; the
    /// per-version artifact loads are skipped on a cache hit.
    pub fn registry(&mut self) -> Result<Arc<HydratedRegistry>> {
        let manifest_path = self.root.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(RegistryError::ManifestMissing {
                path: manifest_path,
            });
        }
        let checksum = Checksum::from_file(&manifest_path)?;

        if let Some((cached_checksum, hydrated)) = &self.cached {
            if *cached_checksum == checksum {
                tracing::debug!(root = %self.root.display(), "manifest unchanged, reusing hydrated registry");
                return Ok(Arc::clone(hydrated));
            }
        }

        let hydrated = Arc::new(SchemaRegistry::open(&self.root)?.resolve());
        self.cached = Some((checksum, Arc::clone(&hydrated)));
        Ok(hydrated)
    }

    /// A catalog over the (possibly cached) hydrated registry
    pub fn catalog(&mut self) -> Result<Catalog> {
        Ok(Catalog::new(&*self.registry()?))
    }

    /// Drop the cached registry; the next access re-hydrates unconditionally
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
