// Configuration loading

pub mod settings;

pub use settings::{
    validate_archive_name, validate_rows_per_batch, Settings, SettingsError, DEFAULT_ARCHIVE_NAME,
    DEFAULT_ROWS_PER_BATCH, MAX_ROWS_PER_BATCH, MIN_ROWS_PER_BATCH,
};
