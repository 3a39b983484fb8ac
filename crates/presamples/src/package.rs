//! # Presamples Package Facade
//!
//! [`PresamplesPackage`] is the externally-visible object for one package
//! directory. Construction validates the directory structure; afterwards,
//! metadata projections delegate to the uncached [`Manifest`] reader, and
//! the derived [`ParametersMapping`] is built lazily on first use and cached
//! for the facade's lifetime.
//!
//! The cache is never invalidated automatically: calling
//! [`change_seed`](PresamplesPackage::change_seed) and then
//! [`parameters`](PresamplesPackage::parameters) again returns the mapping
//! built before the seed changed. Reconstruct the facade to get a fresh one.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::PresamplesResult;
use crate::manifest::{Manifest, Resource};
use crate::parameters::ParametersMapping;
use crate::validation::validate_presamples_dirpath;

/// One presamples package: a directory holding `datapackage.json` and its
/// referenced sample, index, and name-list files.
#[derive(Debug)]
pub struct PresamplesPackage {
    path: PathBuf,
    manifest: Manifest,
    parameters: Option<ParametersMapping>,
}

impl PresamplesPackage {
    /// Open the package at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PresamplesError::InvalidPackage`](crate::PresamplesError::InvalidPackage)
    /// if the directory is not a structurally valid package (missing or
    /// malformed manifest, dangling file references, digest mismatches).
    pub fn new(path: &Path) -> PresamplesResult<Self> {
        validate_presamples_dirpath(path)?;
        tracing::debug!(path = %path.display(), "opened presamples package");
        Ok(Self {
            path: path.to_path_buf(),
            manifest: Manifest::new(path),
            parameters: None,
        })
    }

    /// Package directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw manifest document, re-read from disk.
    pub fn metadata(&self) -> PresamplesResult<Map<String, Value>> {
        self.manifest.metadata()
    }

    /// Human-readable package name.
    pub fn name(&self) -> PresamplesResult<String> {
        self.manifest.name()
    }

    /// Unique package identifier.
    pub fn id(&self) -> PresamplesResult<String> {
        self.manifest.id()
    }

    /// Reproducibility seed.
    pub fn seed(&self) -> PresamplesResult<i64> {
        self.manifest.seed()
    }

    /// Resource descriptors, in manifest order.
    pub fn resources(&self) -> PresamplesResult<Vec<Resource>> {
        self.manifest.resources()
    }

    /// Number of resources in the package.
    pub fn len(&self) -> PresamplesResult<usize> {
        Ok(self.resources()?.len())
    }

    /// Whether the package holds no resources.
    pub fn is_empty(&self) -> PresamplesResult<bool> {
        Ok(self.resources()?.is_empty())
    }

    /// Overwrite the manifest's `seed`. Does not touch the cached parameter
    /// mapping; see the module docs.
    pub fn change_seed(&self, new: i64) -> PresamplesResult<()> {
        self.manifest.change_seed(new)
    }

    /// The package's parameter mapping over its full resource list.
    ///
    /// Built lazily at first access (which is when name-conflict and shape
    /// checking happen), then cached for the facade's lifetime.
    pub fn parameters(&mut self) -> PresamplesResult<&ParametersMapping> {
        match &mut self.parameters {
            Some(mapping) => Ok(mapping),
            slot @ None => {
                let name = self.manifest.name()?;
                let resources = self.manifest.resources()?;
                let mapping = ParametersMapping::new(&self.path, &resources, &name, None)?;
                Ok(slot.insert(mapping))
            }
        }
    }
}
