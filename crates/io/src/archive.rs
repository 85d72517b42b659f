//! Final ZIP packaging of batch workbooks.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;

/// One batch artifact on disk and the entry name it gets in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name inside the archive, e.g. `Batch_1.xlsx`.
    pub name: String,
    pub path: PathBuf,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

/// Entry name for a batch workbook.
pub fn entry_name(batch_name: &str) -> String {
    format!("{}.xlsx", batch_name)
}

/// Read every artifact back from disk and pack them, in order, into one
/// deflated ZIP held in memory.
pub fn build_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        let bytes = read_back(&entry.name, &entry.path)?;
        writer.start_file(entry.name.as_str(), options)?;
        writer.write_all(&bytes)?;
        debug!("Archived {} ({} bytes)", entry.name, bytes.len());
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

fn read_back(name: &str, path: &Path) -> Result<Vec<u8>, ArchiveError> {
    std::fs::read(path).map_err(|source| ArchiveError::ReadBack { name: name.to_string(), source })
}
