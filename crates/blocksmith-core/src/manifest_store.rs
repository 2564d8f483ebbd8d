//! Process-wide manifest holder
//!
//! Readers take an `Arc` snapshot and keep it for the whole request; a swap
//! replaces the manifest wholesale and never touches a snapshot in use.

use std::path::Path;
use std::sync::Arc;

use blocksmith_schema::{ManifestResult, SchemaManifest};
use parking_lot::RwLock;

/// Holder of the active schema manifest
#[derive(Debug)]
pub struct ManifestStore {
    current: RwLock<Arc<SchemaManifest>>,
}

impl ManifestStore {
    /// Create store over a validated manifest
    ///
    /// # Errors
    /// Returns [`blocksmith_schema::ManifestError::Invalid`] if the manifest
    /// breaks a structural invariant
    pub fn new(manifest: SchemaManifest) -> ManifestResult<Self> {
        manifest.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(manifest)),
        })
    }

    /// Load manifest file into a new store
    ///
    /// # Errors
    /// Returns error if the file cannot be loaded or validated
    pub fn load(path: impl AsRef<Path>) -> ManifestResult<Self> {
        Self::new(SchemaManifest::load(path)?)
    }

    /// Current manifest
    #[must_use]
    pub fn snapshot(&self) -> Arc<SchemaManifest> {
        Arc::clone(&*self.current.read())
    }

    /// Validate and atomically replace the manifest
    ///
    /// Returns the manifest that was replaced.
    ///
    /// # Errors
    /// Returns error if the new manifest is invalid; the store is unchanged
    pub fn replace(&self, manifest: SchemaManifest) -> ManifestResult<Arc<SchemaManifest>> {
        manifest.validate()?;
        let version = manifest.version.clone();
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(manifest));
        tracing::info!(
            from = %previous.version,
            to = %version,
            "schema manifest replaced"
        );
        Ok(previous)
    }

    /// Reload the manifest from a file
    ///
    /// # Errors
    /// Returns error if the file cannot be loaded or validated
    pub fn reload(&self, path: impl AsRef<Path>) -> ManifestResult<Arc<SchemaManifest>> {
        self.replace(SchemaManifest::load(path)?)
    }
}
