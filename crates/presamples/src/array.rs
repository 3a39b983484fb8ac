//! # Irregular Samples Array
//!
//! Presents N independently-stored row blocks B1..Bn, each of shape
//! (r_i, c) with a common column count c, as one logical array of shape
//! (sum(r_i), c). Block order at construction defines the row order of the
//! logical array: block 1 occupies rows `[0, r1)`, block 2 occupies
//! `[r1, r1 + r2)`, and so on.
//!
//! The sole query is full-column extraction ([`IrregularSamplesArray::sample`]);
//! consumers pick their rows by index out of the returned draw. Blocks are
//! opened header-only and columns are read via seeks, so the array never
//! materializes all blocks in memory.

use std::path::PathBuf;

use crate::block::SamplesBlock;
use crate::error::{PresamplesError, PresamplesResult};

/// Read-only logical concatenation of row blocks with equal column counts.
#[derive(Debug)]
pub struct IrregularSamplesArray {
    blocks: Vec<SamplesBlock>,
    rows: usize,
    cols: usize,
}

impl IrregularSamplesArray {
    /// Build the array over an ordered sequence of block files.
    ///
    /// # Errors
    ///
    /// Returns [`PresamplesError::ShapeMismatch`] if any block disagrees
    /// with the first block's column count, plus any block open failure.
    pub fn from_files<I>(paths: I) -> PresamplesResult<Self>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut blocks = Vec::new();
        let mut cols: Option<usize> = None;
        let mut rows = 0;
        for path in paths {
            let block = SamplesBlock::open(&path)?;
            match cols {
                None => cols = Some(block.cols()),
                Some(expected) if expected != block.cols() => {
                    return Err(PresamplesError::ShapeMismatch {
                        expected,
                        found: block.cols(),
                        path,
                    });
                }
                Some(_) => {}
            }
            rows += block.rows();
            blocks.push(block);
        }
        Ok(Self {
            blocks,
            rows,
            cols: cols.unwrap_or(0),
        })
    }

    /// Total logical row count (sum over blocks).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Uniform column count. Zero for an array over no blocks.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// One full draw: column `index` of every block, concatenated in block
    /// order. Length is [`rows()`](Self::rows).
    ///
    /// # Errors
    ///
    /// Returns [`PresamplesError::ColumnOutOfRange`] if `index` is outside
    /// `[0, cols)`.
    pub fn sample(&self, index: usize) -> PresamplesResult<Vec<f64>> {
        if index >= self.cols {
            return Err(PresamplesError::ColumnOutOfRange {
                index,
                columns: self.cols,
            });
        }
        let mut out = Vec::with_capacity(self.rows);
        for block in &self.blocks {
            out.extend(block.read_column(index)?);
        }
        Ok(out)
    }
}
