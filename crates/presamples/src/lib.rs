//! # presamples — Precomputed Monte-Carlo Sample Packages
//!
//! This crate reads "presample packages": directories holding precomputed
//! Monte-Carlo parameter samples plus self-describing metadata, used to feed
//! stochastic simulations without recomputation.
//!
//! - **[`PresamplesPackage`]** — the package facade: validated construction,
//!   identity/provenance projections, seed mutation, and the lazily-built
//!   parameter mapping.
//! - **[`Manifest`]** — uncached reader over a package's `datapackage.json`;
//!   every accessor re-reads the file so a seed change is visible in-process.
//! - **[`ParametersMapping`]** — name-keyed, read-only view over one sample
//!   column, backed by the irregular array.
//! - **[`IrregularSamplesArray`]** — N independently-stored row blocks with
//!   a common column count, addressed as one logical array; the sole query
//!   is full-column extraction.
//! - **[`validation`]** — the `validate_presamples_dirpath` and
//!   `check_name_conflicts` helper functions.
//!
//! ## Typical use
//!
//! ```no_run
//! use presamples::PresamplesPackage;
//!
//! # fn main() -> presamples::PresamplesResult<()> {
//! let mut package = PresamplesPackage::new("data/my-package".as_ref())?;
//! let seed = package.seed()?;
//! let uncertain_share = package.parameters()?.get("uncertain_share")?;
//! # let _ = (seed, uncertain_share);
//! # Ok(())
//! # }
//! ```
//!
//! The crate is synchronous and single-threaded: all operations are direct
//! blocking file reads, and the one write path
//! ([`Manifest::change_seed`]) is a whole-file rewrite. It emits `tracing`
//! events but installs no subscriber.

pub mod array;
pub mod block;
pub mod error;
pub mod manifest;
pub mod package;
pub mod parameters;
pub mod validation;

// Re-export primary types.
pub use array::IrregularSamplesArray;
pub use block::{write_block, SamplesBlock};
pub use error::{PresamplesError, PresamplesResult};
pub use manifest::{IndicesRef, Manifest, NamesRef, Resource, SamplesRef, MANIFEST_FILENAME};
pub use package::PresamplesPackage;
pub use parameters::{ColumnLookup, ParametersMapping};
pub use validation::{check_name_conflicts, validate_presamples_dirpath};
