//! # Package Validation Rules
//!
//! Validates presamples package directories and parameter name lists.
//!
//! ## Validation Layers
//!
//! 1. **Structural validation**: the directory exists, `datapackage.json`
//!    parses, required top-level keys are present.
//! 2. **Reference validation**: every resource's `samples` (and optional
//!    `indices`/`names`) filepath resolves to a file under the package, and
//!    each samples block's header agrees with the declared shape.
//! 3. **Digest validation**: recorded sha256 digests match the recomputed
//!    digest of the referenced samples file.
//!
//! Errors are accumulated into a [`ValidationResult`] so a broken package
//! reports everything wrong with it at once, then surfaced as a single
//! [`PresamplesError::InvalidPackage`].

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::block::SamplesBlock;
use crate::error::{PresamplesError, PresamplesResult};
use crate::manifest::{Resource, MANIFEST_FILENAME};

// ---------------------------------------------------------------------------
// Validation Results
// ---------------------------------------------------------------------------

/// Result of validating a package directory.
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether the package is structurally valid.
    pub is_valid: bool,
    /// Validation errors, if any.
    pub errors: Vec<String>,
    /// Validation warnings (non-fatal).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result.
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error. Marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Add a warning (does not affect validity).
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Convert into a `PresamplesResult`, failing with
    /// [`PresamplesError::InvalidPackage`] if any error was recorded.
    pub fn into_result(self, path: &Path) -> PresamplesResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(PresamplesError::InvalidPackage {
                path: path.to_path_buf(),
                errors: self.errors,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Directory validation
// ---------------------------------------------------------------------------

/// Validate that `path` is a structurally valid presamples package.
///
/// Checks, in order:
/// - the path is a directory containing `datapackage.json`,
/// - the manifest parses as a JSON object with `name`, `id`, `profile` and
///   `resources` keys,
/// - each resource deserializes as a [`Resource`] descriptor,
/// - every referenced `samples`/`indices`/`names` file exists under the
///   package directory,
/// - every samples block opens and its header matches the declared shape,
/// - every recorded samples digest matches the file's recomputed sha256.
///
/// # Errors
///
/// Returns [`PresamplesError::InvalidPackage`] carrying all collected
/// errors.
pub fn validate_presamples_dirpath(path: &Path) -> PresamplesResult<()> {
    let mut result = ValidationResult::ok();

    if !path.is_dir() {
        result.add_error(format!("not a directory: {}", path.display()));
        return result.into_result(path);
    }
    let manifest_path = path.join(MANIFEST_FILENAME);
    if !manifest_path.exists() {
        result.add_error(format!("{MANIFEST_FILENAME} not found"));
        return result.into_result(path);
    }

    let raw = match std::fs::read_to_string(&manifest_path) {
        Ok(raw) => raw,
        Err(e) => {
            result.add_error(format!("cannot read {MANIFEST_FILENAME}: {e}"));
            return result.into_result(path);
        }
    };
    let document: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            result.add_error(format!("{MANIFEST_FILENAME} is not valid JSON: {e}"));
            return result.into_result(path);
        }
    };
    let Some(document) = document.as_object() else {
        result.add_error(format!("{MANIFEST_FILENAME} must be a JSON object"));
        return result.into_result(path);
    };

    for field in ["name", "id", "profile", "resources"] {
        if document.get(field).is_none() {
            result.add_error(format!("missing required field: {field}"));
        }
    }

    if let Some(resources) = document.get("resources") {
        match resources {
            Value::Array(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    match serde_json::from_value::<Resource>(entry.clone()) {
                        Ok(resource) => validate_resource(path, i, &resource, &mut result),
                        Err(e) => {
                            result.add_error(format!("resources[{i}]: invalid descriptor: {e}"))
                        }
                    }
                }
            }
            _ => result.add_error("field `resources` must be an array".to_string()),
        }
    }

    result.into_result(path)
}

/// Validate one resource's file references and digest.
fn validate_resource(path: &Path, i: usize, resource: &Resource, result: &mut ValidationResult) {
    let samples_path = path.join(&resource.samples.filepath);
    if !samples_path.is_file() {
        result.add_error(format!(
            "resources[{i}]: samples file not found: {}",
            resource.samples.filepath
        ));
        return;
    }

    match SamplesBlock::open(&samples_path) {
        Ok(block) if [block.rows(), block.cols()] != resource.samples.shape => {
            result.add_error(format!(
                "resources[{i}]: declared shape {:?} does not match block header [{}, {}]",
                resource.samples.shape,
                block.rows(),
                block.cols()
            ));
        }
        Ok(_) => {}
        Err(e) => result.add_error(format!(
            "resources[{i}]: unreadable samples block {}: {e}",
            resource.samples.filepath
        )),
    }

    if let Some(recorded) = &resource.samples.hash {
        match sha256_hex(&samples_path) {
            Ok(recomputed) if &recomputed != recorded => {
                tracing::warn!(
                    file = %resource.samples.filepath,
                    recorded = %recorded,
                    recomputed = %recomputed,
                    "samples digest mismatch"
                );
                result.add_error(format!(
                    "resources[{i}]: samples digest mismatch for {}",
                    resource.samples.filepath
                ));
            }
            Ok(_) => {}
            Err(e) => result.add_error(format!(
                "resources[{i}]: cannot digest {}: {e}",
                resource.samples.filepath
            )),
        }
    }
    if let Some(dtype) = &resource.samples.dtype {
        if dtype != "float64" {
            result.add_warning(format!(
                "resources[{i}]: unrecognized dtype `{dtype}`, values are read as float64"
            ));
        }
    }

    if let Some(indices) = &resource.indices {
        if !path.join(&indices.filepath).is_file() {
            result.add_error(format!(
                "resources[{i}]: indices file not found: {}",
                indices.filepath
            ));
        }
    }
    if let Some(names) = &resource.names {
        if !path.join(&names.filepath).is_file() {
            result.add_error(format!(
                "resources[{i}]: names file not found: {}",
                names.filepath
            ));
        }
    }
}

/// Streaming sha256 of a file, lowercase hex.
fn sha256_hex(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}

// ---------------------------------------------------------------------------
// Name conflicts
// ---------------------------------------------------------------------------

/// Check that no parameter name appears in more than one list (or twice in
/// one list).
///
/// # Errors
///
/// Returns [`PresamplesError::NameConflict`] naming every duplicated name,
/// sorted.
pub fn check_name_conflicts(name_lists: &[Vec<String>]) -> PresamplesResult<()> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for name in name_lists.iter().flatten() {
        if !seen.insert(name.as_str()) {
            duplicates.insert(name.clone());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(PresamplesError::NameConflict {
            names: duplicates.into_iter().collect(),
        })
    }
}
