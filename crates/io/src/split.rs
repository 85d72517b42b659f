//! The split pipeline: load -> plan -> write each batch -> archive.
//!
//! Every batch artifact is written into a scoped temporary directory that
//! is removed when the run returns, whether it succeeded or not. Batches
//! are produced strictly in order and the first failure ends the run
//! without returning any partial output.

use std::fmt;
use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use sheetsplit_engine::{build_batch, BatchPlan, BatchSpan, Progress, ValidationMode};

use crate::archive::{build_archive, entry_name, ArchiveEntry};
use crate::error::{Error, Result, SplitError};
use crate::xlsx_load::load_active_sheet;
use crate::xlsx_write::write_batch;

/// Rows per batch when the caller does not choose.
pub const DEFAULT_ROWS_PER_BATCH: u32 = 1000;

/// Knobs for one split run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    pub rows_per_batch: u32,
    pub validation_mode: ValidationMode,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { rows_per_batch: DEFAULT_ROWS_PER_BATCH, validation_mode: ValidationMode::Verbatim }
    }
}

impl SplitOptions {
    pub fn new(rows_per_batch: u32) -> Self {
        Self { rows_per_batch, ..Default::default() }
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }
}

/// What a split run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    /// Name of the sheet that was split.
    pub sheet: String,
    /// Sheets that were hidden before loading.
    pub unhidden_sheets: Vec<String>,
    pub rows_per_batch: u32,
    pub data_rows: u32,
    pub batches: usize,
    pub cells_written: usize,
    /// Validation rules attached to the source sheet.
    pub validation_rules: usize,
    /// `<dataValidation>` ranges written across all batches.
    pub validation_ranges_written: usize,
    /// Ranges left out of batches they do not touch (relocate mode).
    pub validation_ranges_dropped: usize,
    pub archive_bytes: usize,
}

impl SplitReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Split '{}': {} data rows into {} batch{} of up to {} rows ({} cells)",
            self.sheet,
            self.data_rows,
            self.batches,
            if self.batches == 1 { "" } else { "es" },
            self.rows_per_batch,
            self.cells_written,
        );
        if self.validation_rules > 0 {
            out.push_str(&format!(", {} validation ranges", self.validation_ranges_written));
        }
        if self.validation_ranges_dropped > 0 {
            out.push_str(&format!(" ({} dropped)", self.validation_ranges_dropped));
        }
        out
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Archive bytes plus the run report.
#[derive(Debug, Clone)]
pub struct SplitOutput {
    pub archive: Vec<u8>,
    pub report: SplitReport,
}

/// Batch boundaries for a workbook, computed without writing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitPlan {
    pub sheet: String,
    pub row_count: u32,
    pub data_rows: u32,
    pub rows_per_batch: u32,
    pub batches: Vec<BatchSpan>,
}

/// Split the active sheet of `bytes` into batches of `rows_per_batch` data
/// rows and return the ZIP archive of `Batch_<n>.xlsx` files.
pub fn split(bytes: &[u8], rows_per_batch: u32) -> Result<Vec<u8>> {
    split_with_progress(bytes, SplitOptions::new(rows_per_batch), |_| {}).map(|out| out.archive)
}

/// Like [`split`], reporting progress after each batch completes.
pub fn split_with_progress<F>(bytes: &[u8], options: SplitOptions, on_progress: F) -> Result<SplitOutput>
where
    F: FnMut(Progress),
{
    split_in(bytes, options, &std::env::temp_dir(), on_progress)
}

/// Like [`split_with_progress`], creating the scoped working directory
/// under `scratch_root` instead of the system temp directory.
pub fn split_in<F>(
    bytes: &[u8],
    options: SplitOptions,
    scratch_root: &Path,
    mut on_progress: F,
) -> Result<SplitOutput>
where
    F: FnMut(Progress),
{
    let loaded = load_active_sheet(bytes)?;
    let sheet = loaded.sheet;
    let plan = BatchPlan::for_sheet(&sheet, options.rows_per_batch)?;
    let total = plan.total_batches();
    info!(
        "Splitting '{}': {} data rows, {} per batch, {} batches",
        sheet.name,
        plan.data_rows(),
        options.rows_per_batch,
        total
    );

    let workdir = tempfile::Builder::new()
        .prefix("sheetsplit-")
        .tempdir_in(scratch_root)
        .map_err(Error::Scratch)?;
    debug!("Working directory {}", workdir.path().display());

    let mut report = SplitReport {
        sheet: sheet.name.clone(),
        unhidden_sheets: loaded.unhidden,
        rows_per_batch: options.rows_per_batch,
        data_rows: plan.data_rows(),
        batches: total,
        validation_rules: sheet.validations.len(),
        ..Default::default()
    };

    let mut entries = Vec::with_capacity(total);
    for span in plan.spans() {
        let batch = build_batch(&sheet, span, options.validation_mode);
        let name = entry_name(&batch.name);
        let path = workdir.path().join(&name);

        let stats = write_batch(&batch, &path)
            .map_err(|source| SplitError { batch: span.index, source })?;
        report.cells_written += stats.cells;
        report.validation_ranges_written += stats.validation_ranges;
        report.validation_ranges_dropped += batch.dropped_ranges;
        entries.push(ArchiveEntry::new(name, path));

        let progress = Progress { batch: span.index, total };
        debug!("{}", progress);
        on_progress(progress);
    }

    let archive = build_archive(&entries)?;
    report.archive_bytes = archive.len();
    info!("{}", report.summary());

    Ok(SplitOutput { archive, report })
}

/// Compute the batch plan for a workbook without writing any batch.
pub fn plan(bytes: &[u8], rows_per_batch: u32) -> Result<SplitPlan> {
    let sheet = load_active_sheet(bytes)?.sheet;
    let plan = BatchPlan::for_sheet(&sheet, rows_per_batch)?;
    Ok(SplitPlan {
        sheet: sheet.name,
        row_count: plan.row_count,
        data_rows: plan.data_rows(),
        rows_per_batch,
        batches: plan.spans(),
    })
}
