//! Sheet model and batch splitting for xlsx workbooks.
//!
//! This crate has no I/O. `sheetsplit-io` fills a [`SourceSheet`] from an
//! xlsx package and serializes each [`Batch`] back out.

pub mod batch;
pub mod cell;
pub mod range;
pub mod sheet;
pub mod style;
pub mod validation;

pub use batch::{build_batch, Batch, BatchPlan, BatchSpan, PlanError, Progress};
pub use cell::{Cell, CellValue};
pub use range::{CellRange, CellRef};
pub use sheet::SourceSheet;
pub use style::StyleBundle;
pub use validation::{ValidationMode, ValidationRule};
