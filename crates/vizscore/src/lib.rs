//! # vizscore
//!
//! **CLI Binary**
//!
//! Entry point for the `vizscore` command-line application. It
//! orchestrates the other crates: parse arguments, load the scoring
//! config, dispatch to single-file or directory analysis, and hand the
//! receipt to the writers.
//!
//! This crate should contain minimal business logic.

pub mod cli;
mod commands;
mod error_hints;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use cli::{Cli, Commands};
use vizscore_config::ScoreConfig;
use vizscore_extract::ExtractError;
use vizscore_types::{SCHEMA_VERSION, WorkbookReceipt};

/// Entry point used by the `vizscore` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Completions(args)) => {
            commands::completions::handle(&args);
            Ok(())
        }
        Some(Commands::Analyze(args)) => dispatch(&args),
        None => dispatch(&cli.analyze),
    }
}

fn dispatch(args: &cli::CliAnalyzeArgs) -> Result<()> {
    // Config problems are fatal before any workbook is read.
    let config = vizscore_config::load_config(args.config.as_deref())?;

    let path = args
        .path
        .as_deref()
        .ok_or_else(|| anyhow!("input path required: pass a .twb/.twbx file or a directory"))?;
    if !path.exists() {
        return Err(anyhow!("input path does not exist: {}", path.display()));
    }

    if path.is_dir() {
        commands::batch::handle(path, args, &config)
    } else {
        commands::analyze::handle(path, args, &config)
    }
}

/// Analyze one workbook's bytes into a scored receipt.
///
/// Library-facing counterpart of the `analyze` command: extraction,
/// scoring, and summarization over in-memory bytes, no I/O.
pub fn analyze_workbook_bytes(
    bytes: &[u8],
    source_name: &str,
    config: &ScoreConfig,
) -> Result<WorkbookReceipt, ExtractError> {
    let mut records = vizscore_extract::extract_workbook(bytes, source_name, config)?;
    vizscore_score::score_records(&mut records, config);
    let summary = vizscore_model::summarize_workbook(&records);
    Ok(WorkbookReceipt {
        schema_version: SCHEMA_VERSION,
        workbook: source_name.to_string(),
        summary,
        worksheets: records,
    })
}

/// Analyze one workbook file from disk.
pub fn analyze_workbook_file(
    path: &Path,
    config: &ScoreConfig,
) -> Result<WorkbookReceipt> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read workbook {}", path.display()))?;
    let name = source_name(path);
    analyze_workbook_bytes(&bytes, &name, config)
        .with_context(|| format!("failed to analyze {}", path.display()))
}

/// Display name for a workbook path: the file name, lossily decoded.
pub(crate) fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render an error chain with hints for common failure modes.
pub fn format_error(err: &anyhow::Error) -> String {
    error_hints::format(err)
}
