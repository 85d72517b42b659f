// sheetsplit CLI - split a workbook's active sheet into batch workbooks

mod exit_codes;
mod logger;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use sheetsplit_config::{validate_archive_name, validate_rows_per_batch, Settings};
use sheetsplit_engine::ValidationMode;
use sheetsplit_io::{SplitOptions, SplitPlan, SplitReport};

use exit_codes::{split_exit_code, ErrorOutput, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sheetsplit")]
#[command(about = "Split a spreadsheet's active sheet into smaller workbooks")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/sheetsplit/settings.json)
    #[arg(long, global = true, env = "SHEETSPLIT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// More log output on stderr (repeatable)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the active sheet into Batch_<n>.xlsx files packed in one zip
    #[command(after_help = "\
Examples:
  sheetsplit split contacts.xlsx
  sheetsplit split contacts.xlsx -n 500 -o parts.zip
  sheetsplit split contacts.xlsx --relocate-validations --json")]
    Split {
        /// Source workbook (.xlsx)
        input: PathBuf,

        /// Data rows per batch, 10-10000 (default from settings: 1000)
        #[arg(long, short = 'n', value_name = "ROWS")]
        rows: Option<u32>,

        /// Output archive (default: settings archive name next to the input)
        #[arg(long, short = 'o', value_name = "OUT.zip")]
        output: Option<PathBuf>,

        /// Map validation ranges onto each batch's rows instead of copying them unchanged
        #[arg(long)]
        relocate_validations: bool,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show how a workbook would be split, without writing anything
    Plan {
        /// Source workbook (.xlsx)
        input: PathBuf,

        /// Data rows per batch, 10-10000 (default from settings: 1000)
        #[arg(long, short = 'n', value_name = "ROWS")]
        rows: Option<u32>,

        /// Print the plan as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.quiet, cli.verbose));

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let (result, json) = match cli.command {
        Commands::Split { input, rows, output, relocate_validations, json } => {
            let args = SplitArgs { input, rows, output, relocate_validations, json, quiet: cli.quiet };
            (cmd_split(&settings, args), json)
        }
        Commands::Plan { input, rows, json } => (cmd_plan(&settings, &input, rows, json), json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            e.output().print(json);
            ExitCode::from(e.code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub kind: &'static str,
    pub message: String,
    pub hint: Option<String>,
    pub batch: Option<usize>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, kind: "usage", message: msg.into(), hint: None, batch: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, kind: "io", message: msg.into(), hint: None, batch: None }
    }

    /// Create error from a failed split run with its stage's exit code.
    pub fn split(err: sheetsplit_io::Error) -> Self {
        let hint = match &err {
            sheetsplit_io::Error::Load(_) => Some("is the input a valid .xlsx workbook?".to_string()),
            _ => None,
        };
        let batch = match &err {
            sheetsplit_io::Error::Split(e) => Some(e.batch),
            _ => None,
        };
        Self { code: split_exit_code(&err), kind: err.kind(), message: err.to_string(), hint, batch }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn output(&self) -> ErrorOutput {
        ErrorOutput {
            error: self.kind.to_string(),
            message: self.message.clone(),
            batch: self.batch,
            hint: self.hint.clone(),
            exit_code: self.code,
        }
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// The batch size from the flag, else from settings, checked against 10-10000.
fn resolve_rows(flag: Option<u32>, settings: &Settings) -> Result<u32, CliError> {
    match flag {
        Some(rows) => validate_rows_per_batch(rows)
            .map_err(|e| CliError::args(e.to_string()).with_hint("pass -n with a value between 10 and 10000")),
        None => validate_rows_per_batch(settings.rows_per_batch).map_err(|e| {
            CliError::args(format!("split.rowsPerBatch: {}", e))
                .with_hint("fix the settings file or pass -n")
        }),
    }
}

fn read_input(input: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(input).map_err(|e| CliError::io(format!("cannot read {}: {}", input.display(), e)))
}

/// `<input dir>/<archive name>`.
fn default_output(input: &Path, settings: &Settings) -> Result<PathBuf, CliError> {
    validate_archive_name(&settings.archive_name).map_err(|e| {
        CliError::args(format!("split.archiveName: {}", e)).with_hint("fix the settings file or pass -o")
    })?;
    let dir = match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(dir.join(settings.archive_name.trim()))
}

/// Write through a temporary file in the destination directory so a failed
/// run never leaves a truncated archive behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let write_err = |e: std::io::Error| CliError::io(format!("cannot write {}: {}", path.display(), e));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

// ============================================================================
// split
// ============================================================================

struct SplitArgs {
    input: PathBuf,
    rows: Option<u32>,
    output: Option<PathBuf>,
    relocate_validations: bool,
    json: bool,
    quiet: bool,
}

#[derive(Serialize)]
struct SplitJson<'a> {
    output: String,
    #[serde(flatten)]
    report: &'a SplitReport,
}

fn cmd_split(settings: &Settings, args: SplitArgs) -> Result<(), CliError> {
    let rows = resolve_rows(args.rows, settings)?;
    let mode = if args.relocate_validations {
        ValidationMode::Relocate
    } else {
        settings.validation_ranges
    };
    let output = match args.output {
        Some(path) => path,
        None => default_output(&args.input, settings)?,
    };
    debug!("rows={} validations={} output={}", rows, mode.as_str(), output.display());

    let bytes = read_input(&args.input)?;
    let show_progress = !args.quiet && !args.json;
    let options = SplitOptions::new(rows).with_validation_mode(mode);
    let result = sheetsplit_io::split_with_progress(&bytes, options, |progress| {
        if show_progress {
            eprintln!("{}", progress);
        }
    })
    .map_err(CliError::split)?;

    write_atomic(&output, &result.archive)?;

    if args.json {
        let out = SplitJson { output: output.display().to_string(), report: &result.report };
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::io(format!("cannot encode report: {}", e)))?;
        println!("{}", text);
    } else if !args.quiet {
        for sheet in &result.report.unhidden_sheets {
            eprintln!("note: sheet '{}' was hidden", sheet);
        }
        println!("{}", result.report.summary());
        println!("wrote {}", output.display());
    }
    Ok(())
}

// ============================================================================
// plan
// ============================================================================

fn cmd_plan(settings: &Settings, input: &Path, rows: Option<u32>, json: bool) -> Result<(), CliError> {
    let rows = resolve_rows(rows, settings)?;
    let bytes = read_input(input)?;
    let plan = sheetsplit_io::plan(&bytes, rows).map_err(CliError::split)?;

    if json {
        let text = serde_json::to_string_pretty(&plan)
            .map_err(|e| CliError::io(format!("cannot encode plan: {}", e)))?;
        println!("{}", text);
    } else {
        print!("{}", format_plan(&plan));
    }
    Ok(())
}

fn format_plan(plan: &SplitPlan) -> String {
    let mut out = format!(
        "{}: {} data rows, {} per batch, {} batch{}\n",
        plan.sheet,
        plan.data_rows,
        plan.rows_per_batch,
        plan.batches.len(),
        if plan.batches.len() == 1 { "" } else { "es" }
    );
    for span in &plan.batches {
        if span.data_rows() == 0 {
            out.push_str(&format!("  {}.xlsx  header only\n", span.name()));
        } else {
            out.push_str(&format!(
                "  {}.xlsx  rows {}-{} ({} rows)\n",
                span.name(),
                span.source_start,
                span.source_end,
                span.data_rows()
            ));
        }
    }
    out
}
