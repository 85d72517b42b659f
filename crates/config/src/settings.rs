// Split settings
// Loaded from ~/.config/sheetsplit/settings.json

use log::warn;
use serde::Deserialize;
use sheetsplit_engine::ValidationMode;
use std::fs;
use std::path::{Path, PathBuf};

/// Smallest batch size accepted from users.
pub const MIN_ROWS_PER_BATCH: u32 = 10;
/// Largest batch size accepted from users.
pub const MAX_ROWS_PER_BATCH: u32 = 10_000;
pub const DEFAULT_ROWS_PER_BATCH: u32 = 1000;
pub const DEFAULT_ARCHIVE_NAME: &str = "batches.zip";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(
        "rows per batch must be between {min} and {max}, got {0}",
        min = MIN_ROWS_PER_BATCH,
        max = MAX_ROWS_PER_BATCH
    )]
    RowsPerBatchOutOfRange(u32),

    #[error("archive name must be a plain file name, got '{0}'")]
    InvalidArchiveName(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "split.rowsPerBatch")]
    pub rows_per_batch: u32,

    /// File name of the archive written next to the input.
    #[serde(rename = "split.archiveName")]
    pub archive_name: String,

    #[serde(rename = "split.validationRanges")]
    pub validation_ranges: ValidationMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows_per_batch: DEFAULT_ROWS_PER_BATCH,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            validation_ranges: ValidationMode::Verbatim,
        }
    }
}

/// Check a user-supplied batch size against the accepted range.
pub fn validate_rows_per_batch(rows: u32) -> Result<u32, SettingsError> {
    if (MIN_ROWS_PER_BATCH..=MAX_ROWS_PER_BATCH).contains(&rows) {
        Ok(rows)
    } else {
        Err(SettingsError::RowsPerBatchOutOfRange(rows))
    }
}

/// Check that an archive name is a plain file name.
pub fn validate_archive_name(name: &str) -> Result<(), SettingsError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(SettingsError::InvalidArchiveName(name.to_string()));
    }
    Ok(())
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetsplit");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file is created with the
    /// commented defaults; an unreadable or invalid one yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(path);
            return settings;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Error parsing {}: {}", path.display(), e);
                    warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Check values that serde cannot: the batch size range and the archive name.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_rows_per_batch(self.rows_per_batch)?;
        validate_archive_name(&self.archive_name)
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Data rows per output workbook (10 - 10000)
    "split.rowsPerBatch": 1000,

    // Archive written next to the input file
    "split.archiveName": "batches.zip",

    // Validation rule ranges: "verbatim" copies them unchanged,
    // "relocate" maps them onto each batch's rows
    "split.validationRanges": "verbatim"
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            warn!("Error writing default settings.json: {}", e);
        }
    }

}
