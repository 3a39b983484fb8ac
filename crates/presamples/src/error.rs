//! # Presamples Error Types
//!
//! Structured errors for all package operations. Uses `thiserror` for
//! ergonomic error definitions with diagnostic context.
//!
//! There are no transient failure modes in this crate (no network, no
//! contention), so every error surfaces immediately to the caller; nothing
//! is retried or silently downgraded.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for presamples operations.
pub type PresamplesResult<T> = Result<T, PresamplesError>;

/// Errors from reading, validating, or sampling a presamples package.
#[derive(Error, Debug)]
pub enum PresamplesError {
    /// Structural validation of the package directory failed at construction.
    #[error("invalid presamples package at {}: {}", path.display(), errors.join("; "))]
    InvalidPackage {
        path: PathBuf,
        errors: Vec<String>,
    },

    /// Manifest or data file is absent.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Manifest is not well-formed JSON, or a block file has a bad header.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Expected manifest key is absent.
    #[error("missing manifest field: {field}")]
    MissingField { field: String },

    /// Sample blocks of one package disagree on column count.
    #[error("shape mismatch in {}: expected {expected}, found {found}", path.display())]
    ShapeMismatch {
        expected: usize,
        found: usize,
        path: PathBuf,
    },

    /// The same parameter name appears in more than one resource's name list.
    #[error("conflicting parameter names: {}", names.join(", "))]
    NameConflict { names: Vec<String> },

    /// Sample column index is outside the array's column range.
    #[error("sample column {index} out of range: array has {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },

    /// Lookup by a name that no resource's name list contains.
    #[error("unknown parameter name: {name}")]
    UnknownParameter { name: String },

    /// I/O error from underlying filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
