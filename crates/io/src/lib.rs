//! xlsx I/O for sheetsplit.
//!
//! Loads the active sheet of a workbook into a [`SourceSheet`], writes each
//! batch as a standalone workbook and packs the batches into one ZIP.
//!
//! [`SourceSheet`]: sheetsplit_engine::SourceSheet

pub mod archive;
pub mod error;
pub mod split;
pub mod xlsx_load;
pub mod xlsx_package;
pub mod xlsx_styles;
pub mod xlsx_theme;
pub mod xlsx_validation;
pub mod xlsx_write;

pub use error::{ArchiveError, Error, LoadError, Result, SplitError, WriteError};
pub use split::{
    plan, split, split_in, split_with_progress, SplitOptions, SplitOutput, SplitPlan, SplitReport,
    DEFAULT_ROWS_PER_BATCH,
};
pub use xlsx_load::{load, load_active_sheet, LoadedSheet};
