//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts depend on these values, so changing one is a breaking change.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad settings) |
//! | 3       | Universal        | I/O error reading input or writing output |
//! | 10-19   | split            | Pipeline stage failures                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use sheetsplit_io::Error as SplitRunError;

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, out-of-range batch size, invalid settings.
pub const EXIT_USAGE: u8 = 2;

/// Input could not be read (including a missing input file), the working
/// directory could not be created or the archive could not be written.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Split (10-19)
// =============================================================================

/// The input is not a readable xlsx workbook.
pub const EXIT_SPLIT_LOAD: u8 = 10;

/// A batch workbook could not be produced.
pub const EXIT_SPLIT_BATCH: u8 = 11;

/// The batch workbooks could not be packaged.
pub const EXIT_SPLIT_ARCHIVE: u8 = 12;

/// Map a split run error to its exit code.
pub fn split_exit_code(err: &SplitRunError) -> u8 {
    match err {
        SplitRunError::Load(_) => EXIT_SPLIT_LOAD,
        SplitRunError::Split(_) => EXIT_SPLIT_BATCH,
        SplitRunError::Archive(_) => EXIT_SPLIT_ARCHIVE,
        SplitRunError::Plan(_) => EXIT_USAGE,
        SplitRunError::Scratch(_) => EXIT_IO,
    }
}

/// Structured error output for `--json` runs.
#[derive(Debug, serde::Serialize)]
pub struct ErrorOutput {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub exit_code: u8,
}

impl ErrorOutput {
    /// Print error to stderr (human-readable by default).
    pub fn print(&self, json: bool) {
        if json {
            if let Ok(output) = serde_json::to_string(self) {
                eprintln!("{}", output);
            }
        } else {
            eprintln!("error: {}", self.message);
            if let Some(hint) = &self.hint {
                eprintln!("hint:  {}", hint);
            }
        }
    }
}
