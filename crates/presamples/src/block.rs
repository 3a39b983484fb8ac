//! # Samples Block Storage
//!
//! Custom binary format for one 2-D block of precomputed samples.
//!
//! Format:
//! - [Magic 8 bytes] "PSMP0001"
//! - [Rows u64 LE]
//! - [Columns u64 LE]
//! - [Payload] rows * columns f64 LE values, row-major
//!
//! Opening a block reads only the header; column extraction seeks into the
//! payload on demand, so a package's blocks are never fully materialized in
//! memory at once.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{PresamplesError, PresamplesResult};

const MAGIC: &[u8; 8] = b"PSMP0001";
const HEADER_LEN: u64 = 24;

/// Handle to one on-disk samples block.
///
/// Holds the path and the header dimensions only. The payload stays on disk
/// until a column is read.
#[derive(Debug, Clone)]
pub struct SamplesBlock {
    path: PathBuf,
    rows: usize,
    cols: usize,
}

impl SamplesBlock {
    /// Open a block file, reading and validating its header.
    ///
    /// # Errors
    ///
    /// Returns [`PresamplesError::NotFound`] if the file is absent and
    /// [`PresamplesError::Parse`] if the magic is wrong or the file is
    /// shorter than its header claims.
    pub fn open(path: &Path) -> PresamplesResult<Self> {
        if !path.exists() {
            return Err(PresamplesError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let mut file = File::open(path)?;
        let mut header = [0u8; HEADER_LEN as usize];
        file.read_exact(&mut header)
            .map_err(|_| PresamplesError::Parse {
                path: path.to_path_buf(),
                message: "truncated block header".to_string(),
            })?;
        if &header[..8] != MAGIC {
            return Err(PresamplesError::Parse {
                path: path.to_path_buf(),
                message: format!("bad magic {:?}: not a samples block", &header[..8]),
            });
        }
        let mut dim = [0u8; 8];
        dim.copy_from_slice(&header[8..16]);
        let rows = u64::from_le_bytes(dim) as usize;
        dim.copy_from_slice(&header[16..24]);
        let cols = u64::from_le_bytes(dim) as usize;

        let expected_len = (rows as u64)
            .checked_mul(cols as u64)
            .and_then(|n| n.checked_mul(8))
            .and_then(|n| n.checked_add(HEADER_LEN))
            .ok_or_else(|| PresamplesError::Parse {
                path: path.to_path_buf(),
                message: format!("block dimensions overflow: {rows}x{cols}"),
            })?;
        let actual_len = file.metadata()?.len();
        if actual_len < expected_len {
            return Err(PresamplesError::Parse {
                path: path.to_path_buf(),
                message: format!(
                    "truncated block payload: header claims {rows}x{cols} ({expected_len} bytes), file has {actual_len}"
                ),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            rows,
            cols,
        })
    }

    /// Number of rows in this block.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in this block.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one column of the block, length [`rows()`](Self::rows).
    ///
    /// Seeks to each row's element of the requested column; the rest of the
    /// payload is never read.
    pub fn read_column(&self, col: usize) -> PresamplesResult<Vec<f64>> {
        if col >= self.cols {
            return Err(PresamplesError::ColumnOutOfRange {
                index: col,
                columns: self.cols,
            });
        }
        let mut file = File::open(&self.path)?;
        let mut out = Vec::with_capacity(self.rows);
        let mut buf = [0u8; 8];
        for row in 0..self.rows {
            let offset = HEADER_LEN + ((row * self.cols + col) * 8) as u64;
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut buf)?;
            out.push(f64::from_le_bytes(buf));
        }
        Ok(out)
    }
}

/// Write a block file from row-major values.
///
/// Used by package authoring tools and test fixtures; the read path never
/// calls this.
///
/// # Errors
///
/// Returns [`PresamplesError::ShapeMismatch`] if `values.len()` does not
/// equal `rows * cols`.
pub fn write_block(path: &Path, rows: usize, cols: usize, values: &[f64]) -> PresamplesResult<()> {
    if values.len() != rows * cols {
        return Err(PresamplesError::ShapeMismatch {
            expected: rows * cols,
            found: values.len(),
            path: path.to_path_buf(),
        });
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(MAGIC)?;
    writer.write_all(&(rows as u64).to_le_bytes())?;
    writer.write_all(&(cols as u64).to_le_bytes())?;
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}
