//! Batch planning and construction.
//!
//! A plan partitions the data rows (row 2 onward) into consecutive spans of
//! at most `rows_per_batch` rows. Each batch carries the header row, its span
//! of data rows, the source column widths and the validation rules.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::cell::Cell;
use crate::sheet::SourceSheet;
use crate::validation::{rules_for_batch, ValidationMode, ValidationRule};

/// Error building a batch plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// rows_per_batch must be at least 1.
    ZeroRowsPerBatch,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::ZeroRowsPerBatch => write!(f, "rows per batch must be at least 1"),
        }
    }
}

impl std::error::Error for PlanError {}

/// One batch's slice of source rows (1-based, inclusive).
///
/// A header-only batch has `source_start == 2` and `source_end == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSpan {
    /// 1-based batch number
    pub index: usize,
    pub source_start: u32,
    pub source_end: u32,
}

impl BatchSpan {
    pub fn data_rows(&self) -> u32 {
        (self.source_end + 1).saturating_sub(self.source_start)
    }

    /// Sheet and file stem for this batch: `Batch_<n>`.
    pub fn name(&self) -> String {
        batch_name(self.index)
    }

    /// Destination row for a source data row in this span.
    pub fn dest_row(&self, source_row: u32) -> u32 {
        source_row - self.source_start + 2
    }
}

pub fn batch_name(index: usize) -> String {
    format!("Batch_{}", index)
}

/// The partition of a sheet's data rows into batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    pub row_count: u32,
    pub rows_per_batch: u32,
}

impl BatchPlan {
    pub fn new(row_count: u32, rows_per_batch: u32) -> Result<Self, PlanError> {
        if rows_per_batch == 0 {
            return Err(PlanError::ZeroRowsPerBatch);
        }
        Ok(Self { row_count: row_count.max(1), rows_per_batch })
    }

    pub fn for_sheet(sheet: &SourceSheet, rows_per_batch: u32) -> Result<Self, PlanError> {
        Self::new(sheet.row_count(), rows_per_batch)
    }

    pub fn data_rows(&self) -> u32 {
        self.row_count - 1
    }

    /// ceil(data_rows / rows_per_batch), or 1 for a header-only sheet.
    pub fn total_batches(&self) -> usize {
        let data = self.data_rows();
        if data == 0 {
            return 1;
        }
        data.div_ceil(self.rows_per_batch) as usize
    }

    pub fn spans(&self) -> Vec<BatchSpan> {
        if self.data_rows() == 0 {
            return vec![BatchSpan { index: 1, source_start: 2, source_end: 1 }];
        }
        (0..self.total_batches())
            .map(|b| {
                let source_start = b as u32 * self.rows_per_batch + 2;
                let source_end =
                    source_start.saturating_add(self.rows_per_batch - 1).min(self.row_count);
                BatchSpan { index: b + 1, source_start, source_end }
            })
            .collect()
    }
}

/// Progress after a batch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Batches finished so far (1-based index of the one just completed).
    pub batch: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.batch as f64 / self.total as f64
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Batch {}/{}", self.batch, self.total)
    }
}

// ============================================================================
// Batch construction
// ============================================================================

/// One output sheet, fully materialized. Cells are owned copies of the
/// source cells, so no batch shares style data with the source or another batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub span: BatchSpan,
    pub name: String,
    pub col_count: u16,
    /// rows[0] is the header; rows[i] is destination row i + 1.
    pub rows: Vec<Vec<Cell>>,
    pub col_widths: BTreeMap<u16, Option<f64>>,
    pub validations: Vec<ValidationRule>,
    /// Validation ranges that fell outside this batch (relocate mode only).
    pub dropped_ranges: usize,
}

impl Batch {
    pub fn header(&self) -> &[Cell] {
        &self.rows[0]
    }

    pub fn data_rows(&self) -> &[Vec<Cell>] {
        &self.rows[1..]
    }
}

/// Copy the header, one span of data rows, column widths and validation rules
/// out of the source sheet.
pub fn build_batch(sheet: &SourceSheet, span: BatchSpan, mode: ValidationMode) -> Batch {
    let mut rows = Vec::with_capacity(span.data_rows() as usize + 1);
    rows.push(sheet.row(1));
    for source_row in span.source_start..=span.source_end {
        rows.push(sheet.row(source_row));
    }

    let (validations, dropped_ranges) =
        rules_for_batch(&sheet.validations, mode, span.source_start, span.source_end);

    Batch {
        span,
        name: span.name(),
        col_count: sheet.col_count(),
        rows,
        col_widths: sheet.col_widths.clone(),
        validations,
        dropped_ranges,
    }
}
