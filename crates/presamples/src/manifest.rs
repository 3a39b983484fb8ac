//! # Package Manifest Reader
//!
//! Implements [`Manifest`] — the reader over a package directory's
//! `datapackage.json` — and the typed [`Resource`] descriptors it contains.
//!
//! ## Manifest format
//!
//! A JSON object with required keys `name` (string), `id` (string),
//! `profile` (string constant) and `resources` (array), plus an optional
//! `seed` (integer). Each resource describes one stored block:
//!
//! ```text
//! Resource
//! ├── type
//! ├── samples  { filepath, hash, shape: [rows, cols], dtype }
//! ├── indices  { filepath, hash }            (optional)
//! ├── names    { filepath }                  (optional)
//! └── matrix / row-col labels / profile / format / mediatype  (optional)
//! ```
//!
//! ## Freshness invariant
//!
//! Every accessor re-reads `datapackage.json` from disk; nothing is cached
//! on this type. [`Manifest::change_seed`] is the one write path in the
//! crate, and an in-process reader must observe the new seed on its next
//! projection — a cached metadata field would break that. Derived objects
//! (parameter mappings, sample arrays) are immutable snapshots and must be
//! reconstructed to observe a changed seed.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PresamplesError, PresamplesResult};

/// Manifest filename inside every package directory.
pub const MANIFEST_FILENAME: &str = "datapackage.json";

// ---------------------------------------------------------------------------
// Resource descriptors
// ---------------------------------------------------------------------------

/// Reference to a resource's 2-D samples block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplesRef {
    /// Block filepath, resolved relative to the package directory.
    pub filepath: String,
    /// Integrity digest (sha256 hex) of the block file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Block shape as `[rows, columns]`.
    pub shape: [usize; 2],
    /// Element type tag (e.g., `float64`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
}

/// Reference to a resource's auxiliary index block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicesRef {
    /// Index filepath, resolved relative to the package directory.
    pub filepath: String,
    /// Integrity digest (sha256 hex) of the index file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Reference to a resource's name-list file (JSON array of strings, one
/// entry per samples row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamesRef {
    /// Name-list filepath, resolved relative to the package directory.
    pub filepath: String,
}

/// One manifest entry describing one stored block.
///
/// The `{data package index}` embedded in resource filenames need not be
/// contiguous, but must be unique within one package. Resource order in the
/// manifest is the single source of truth for row-index assignment and is
/// preserved exactly — never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Semantic label for the kind of samples this resource holds.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// The 2-D samples block.
    pub samples: SamplesRef,
    /// Optional auxiliary index block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<IndicesRef>,
    /// Optional name list, one entry per samples row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<NamesRef>,
    /// Matrix this resource targets, for matrix-typed presamples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<String>,
    #[serde(
        rename = "row from label",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub row_from_label: Option<String>,
    #[serde(
        rename = "row to label",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub row_to_label: Option<String>,
    #[serde(rename = "row dict", default, skip_serializing_if = "Option::is_none")]
    pub row_dict: Option<String>,
    #[serde(
        rename = "col from label",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub col_from_label: Option<String>,
    #[serde(
        rename = "col to label",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub col_to_label: Option<String>,
    #[serde(rename = "col dict", default, skip_serializing_if = "Option::is_none")]
    pub col_dict: Option<String>,
    /// Resource profile constant (`data-resource`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Storage format tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Media type of the samples file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediatype: Option<String>,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Reader over one package's `datapackage.json`.
///
/// Holds only the package path. See the module docs for the freshness
/// invariant governing why no metadata is cached here.
#[derive(Debug, Clone)]
pub struct Manifest {
    package_path: PathBuf,
}

impl Manifest {
    /// Create a reader for the package at `package_path`.
    ///
    /// Nothing is read until the first accessor; a missing manifest fails at
    /// that point, not here.
    pub fn new(package_path: &Path) -> Self {
        Self {
            package_path: package_path.to_path_buf(),
        }
    }

    /// Path of the manifest file itself.
    pub fn manifest_path(&self) -> PathBuf {
        self.package_path.join(MANIFEST_FILENAME)
    }

    /// Read the manifest document fresh from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PresamplesError::NotFound`] if the manifest file is absent
    /// and [`PresamplesError::Parse`] if it is not a well-formed JSON object.
    pub fn metadata(&self) -> PresamplesResult<Map<String, Value>> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(PresamplesError::NotFound { path });
        }
        let file = File::open(&path)?;
        let value: Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| PresamplesError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(PresamplesError::Parse {
                path,
                message: format!("manifest must be a JSON object, got {other}"),
            }),
        }
    }

    /// One top-level manifest field, re-read from disk.
    fn field(&self, key: &str) -> PresamplesResult<Value> {
        self.metadata()?
            .remove(key)
            .ok_or_else(|| PresamplesError::MissingField {
                field: key.to_string(),
            })
    }

    fn string_field(&self, key: &str) -> PresamplesResult<String> {
        match self.field(key)? {
            Value::String(s) => Ok(s),
            other => Err(PresamplesError::Parse {
                path: self.manifest_path(),
                message: format!("field `{key}` must be a string, got {other}"),
            }),
        }
    }

    /// Human-readable package name.
    pub fn name(&self) -> PresamplesResult<String> {
        self.string_field("name")
    }

    /// Unique package identifier.
    pub fn id(&self) -> PresamplesResult<String> {
        self.string_field("id")
    }

    /// Reproducibility seed stored in the manifest.
    pub fn seed(&self) -> PresamplesResult<i64> {
        let value = self.field("seed")?;
        value.as_i64().ok_or_else(|| PresamplesError::Parse {
            path: self.manifest_path(),
            message: format!("field `seed` must be an integer, got {value}"),
        })
    }

    /// Resource descriptors, in manifest order.
    pub fn resources(&self) -> PresamplesResult<Vec<Resource>> {
        let value = self.field("resources")?;
        serde_json::from_value(value).map_err(|e| PresamplesError::Parse {
            path: self.manifest_path(),
            message: format!("invalid resource descriptor: {e}"),
        })
    }

    /// Overwrite the `seed` field and rewrite the manifest file.
    ///
    /// The new document is serialized to a sibling temp file and renamed
    /// over `datapackage.json`, so a concurrent reader in the same process
    /// never observes a partially-written manifest. Not safe under
    /// concurrent writers from multiple processes.
    ///
    /// Already-constructed parameter mappings and sample arrays are
    /// immutable snapshots; reconstruct them to observe the new seed.
    pub fn change_seed(&self, new: i64) -> PresamplesResult<()> {
        let mut current = self.metadata()?;
        current.insert("seed".to_string(), Value::from(new));

        let path = self.manifest_path();
        let tmp = self.package_path.join(format!("{MANIFEST_FILENAME}.tmp"));
        let file = File::create(&tmp)?;
        if let Err(e) = serde_json::to_writer_pretty(file, &Value::Object(current)) {
            // Serializing a Value can only fail on I/O; don't leave the
            // half-written temp file behind.
            let _ = fs::remove_file(&tmp);
            return Err(PresamplesError::Io(std::io::Error::other(e)));
        }
        fs::rename(&tmp, &path)?;
        tracing::info!(seed = new, path = %path.display(), "presamples seed changed");
        Ok(())
    }
}
