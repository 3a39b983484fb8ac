//! # Parameter Name Index
//!
//! Implements [`ParametersMapping`] — the binding between human-readable
//! parameter names and rows of the [`IrregularSamplesArray`].
//!
//! One ordered resource list drives both constructions: the concatenated
//! name lists and the stacked sample blocks are built from the same
//! `Vec<Resource>` in the same order, so a name's position in the
//! concatenation is exactly its global row index in the array. Row indices
//! accumulate monotonically across resources.
//!
//! The mapping acts as a read-only keyed collection of float values for a
//! fixed, chosen sample column (the "draw"): membership, ordered iteration,
//! length, keyed lookup, and bulk retrieval of the whole draw.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::array::IrregularSamplesArray;
use crate::error::{PresamplesError, PresamplesResult};
use crate::manifest::Resource;
use crate::validation::check_name_conflicts;

/// How [`ParametersMapping::get`] materializes the chosen column.
///
/// `Fresh` re-reads the column from disk on every lookup, so a lookup always
/// reflects the files as they are now. `Cached` materializes the chosen
/// column once at construction and serves every lookup from memory — one
/// column read total instead of one per lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnLookup {
    /// Re-materialize the full column on every named lookup.
    #[default]
    Fresh,
    /// Materialize the chosen column once, at construction.
    Cached,
}

/// Read-only, name-keyed view over one sample column of a package.
#[derive(Debug)]
pub struct ParametersMapping {
    mapping: IndexMap<String, usize>,
    array: IrregularSamplesArray,
    ids: Vec<(PathBuf, String, String)>,
    sample_index: usize,
    cached_column: Option<Vec<f64>>,
}

impl ParametersMapping {
    /// Build the mapping over `resources`, in manifest order, for the given
    /// sample column (default 0). Uses [`ColumnLookup::Fresh`].
    ///
    /// # Errors
    ///
    /// - [`PresamplesError::MissingField`] if a resource carries no `names`
    ///   list,
    /// - [`PresamplesError::ShapeMismatch`] if a name list's length differs
    ///   from its resource's declared row count, or if the total name count
    ///   differs from the blocks' actual row count,
    /// - [`PresamplesError::NameConflict`] if any name appears in more than
    ///   one resource's list,
    /// - [`PresamplesError::ShapeMismatch`] if the resources' blocks
    ///   disagree on column count,
    /// - [`PresamplesError::Parse`]/[`PresamplesError::NotFound`] for
    ///   unreadable name-list or block files.
    pub fn new(
        path: &Path,
        resources: &[Resource],
        package_name: &str,
        sample_index: Option<usize>,
    ) -> PresamplesResult<Self> {
        Self::with_lookup(path, resources, package_name, sample_index, ColumnLookup::Fresh)
    }

    /// Like [`new`](Self::new), with an explicit column lookup strategy.
    pub fn with_lookup(
        path: &Path,
        resources: &[Resource],
        package_name: &str,
        sample_index: Option<usize>,
        lookup: ColumnLookup,
    ) -> PresamplesResult<Self> {
        let mut name_lists = Vec::with_capacity(resources.len());
        for resource in resources {
            let names = resource
                .names
                .as_ref()
                .ok_or_else(|| PresamplesError::MissingField {
                    field: "names".to_string(),
                })?;
            let list = load_name_list(&path.join(&names.filepath))?;
            if list.len() != resource.samples.shape[0] {
                return Err(PresamplesError::ShapeMismatch {
                    expected: resource.samples.shape[0],
                    found: list.len(),
                    path: path.join(&names.filepath),
                });
            }
            name_lists.push(list);
        }
        check_name_conflicts(&name_lists)?;

        // Global row index = position in the concatenation of all lists.
        let mut mapping = IndexMap::new();
        for (index, name) in name_lists.into_iter().flatten().enumerate() {
            mapping.insert(name, index);
        }

        let array = IrregularSamplesArray::from_files(
            resources.iter().map(|r| path.join(&r.samples.filepath)),
        )?;
        // A manifest may declare more rows than the blocks actually hold;
        // every mapped row must fall inside a materialized column.
        if mapping.len() != array.rows() {
            return Err(PresamplesError::ShapeMismatch {
                expected: array.rows(),
                found: mapping.len(),
                path: path.to_path_buf(),
            });
        }

        let sample_index = sample_index.unwrap_or(0);
        let cached_column = match lookup {
            ColumnLookup::Fresh => None,
            ColumnLookup::Cached => Some(array.sample(sample_index)?),
        };

        let ids = mapping
            .keys()
            .map(|name| (path.to_path_buf(), package_name.to_string(), name.clone()))
            .collect();

        tracing::debug!(
            parameters = mapping.len(),
            resources = resources.len(),
            sample_index,
            "built parameters mapping"
        );
        Ok(Self {
            mapping,
            array,
            ids,
            sample_index,
            cached_column,
        })
    }

    /// Number of parameter names.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Whether the mapping holds no names.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Membership test by name.
    pub fn contains(&self, name: &str) -> bool {
        self.mapping.contains_key(name)
    }

    /// Parameter names, in global-row-index order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.mapping.keys().map(String::as_str)
    }

    /// The sample column this mapping was built over.
    pub fn sample_index(&self) -> usize {
        self.sample_index
    }

    /// Provenance triples `(package path, package name, parameter name)`,
    /// in global-row-index order.
    pub fn ids(&self) -> &[(PathBuf, String, String)] {
        &self.ids
    }

    /// The underlying irregular array.
    pub fn array(&self) -> &IrregularSamplesArray {
        &self.array
    }

    /// Value of `name` in the chosen sample column.
    ///
    /// With [`ColumnLookup::Fresh`] this materializes the full column per
    /// call; with [`ColumnLookup::Cached`] it reads from the column cached
    /// at construction.
    ///
    /// # Errors
    ///
    /// Returns [`PresamplesError::UnknownParameter`] if no resource's name
    /// list contains `name`.
    pub fn get(&self, name: &str) -> PresamplesResult<f64> {
        let row = self.row(name)?;
        match &self.cached_column {
            Some(column) => Ok(column[row]),
            None => Ok(self.array.sample(self.sample_index)?[row]),
        }
    }

    /// Value of `name` in an explicitly chosen column, bypassing the
    /// mapping's own column selection. Always materializes fresh.
    pub fn get_at(&self, name: &str, column: usize) -> PresamplesResult<f64> {
        let row = self.row(name)?;
        Ok(self.array.sample(column)?[row])
    }

    /// The full chosen-column draw: every parameter's value, in
    /// global-row-index order.
    pub fn values(&self) -> PresamplesResult<Vec<f64>> {
        match &self.cached_column {
            Some(column) => Ok(column.clone()),
            None => self.array.sample(self.sample_index),
        }
    }

    fn row(&self, name: &str) -> PresamplesResult<usize> {
        self.mapping
            .get(name)
            .copied()
            .ok_or_else(|| PresamplesError::UnknownParameter {
                name: name.to_string(),
            })
    }
}

/// Load a name-list file: a JSON array of strings.
fn load_name_list(path: &Path) -> PresamplesResult<Vec<String>> {
    if !path.exists() {
        return Err(PresamplesError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| PresamplesError::Parse {
        path: path.to_path_buf(),
        message: format!("name list must be a JSON array of strings: {e}"),
    })
}
