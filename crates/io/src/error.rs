//! Error types for loading, splitting and archiving.
//!
//! Each stage has its own enum so callers can tell a bad input file from a
//! failed batch or a failed archive. [`Error`] wraps all three for the
//! `split()` entry points.

/// The source workbook could not be opened or understood.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Bytes are not a ZIP container.
    #[error("not an xlsx package: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A package part is not well-formed XML.
    #[error("malformed part '{part}': {message}")]
    Xml { part: String, message: String },

    /// A part the workbook cannot do without is absent.
    #[error("missing required part '{0}'")]
    MissingPart(String),

    #[error("workbook contains no sheets")]
    NoSheets,

    /// The cell reader rejected the package.
    #[error("failed to open workbook: {0}")]
    Workbook(#[source] calamine::XlsxError),

    /// Cell data could not be read.
    #[error("failed to read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A batch workbook could not be serialized.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("xlsx writer: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Reopening the written package to set column widths failed.
    #[error("batch package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("batch worksheet XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Producing one batch failed. `batch` is 1-based.
#[derive(Debug, thiserror::Error)]
#[error("batch {batch} failed: {source}")]
pub struct SplitError {
    pub batch: usize,
    #[source]
    pub source: WriteError,
}

/// The batch artifacts could not be packaged.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to read back '{name}': {source}")]
    ReadBack {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("zip writer: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure of a split run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error("archive failed: {0}")]
    Archive(#[from] ArchiveError),

    /// rows_per_batch was zero.
    #[error("invalid batch size: {0}")]
    Plan(#[from] sheetsplit_engine::PlanError),

    /// The working directory for batch files could not be created.
    #[error("cannot create working directory: {0}")]
    Scratch(#[source] std::io::Error),
}

impl Error {
    /// Short machine-readable kind, used by the CLI's JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Load(_) => "load",
            Error::Split(_) => "split",
            Error::Archive(_) => "archive",
            Error::Plan(_) => "plan",
            Error::Scratch(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl LoadError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        LoadError::Xml { part: part.to_string(), message: err.to_string() }
    }
}
