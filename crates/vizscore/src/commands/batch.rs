//! Directory-mode analysis.
//!
//! Workbook files are collected up front and sorted by path, so the
//! final receipt is deterministic regardless of filesystem traversal
//! order. A file that fails to read or extract becomes an error
//! envelope in the receipt; the batch never aborts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vizscore_config::ScoreConfig;
use vizscore_model::summarize_corpus;
use vizscore_types::{CorpusReceipt, SCHEMA_VERSION, WorkbookAnalysis, WorkbookSummary};

use crate::cli::CliAnalyzeArgs;

const WORKBOOK_EXTENSIONS: [&str; 2] = ["twb", "twbx"];

pub(crate) fn handle(dir: &Path, args: &CliAnalyzeArgs, config: &ScoreConfig) -> Result<()> {
    let files = collect_workbook_files(dir, args.recursive)?;

    let mut workbooks: Vec<WorkbookAnalysis> = Vec::with_capacity(files.len());
    for file in &files {
        let analysis = analyze_file(file, config);
        if args.verbose > 0 {
            match &analysis.error {
                None => eprintln!(
                    "{}: {} worksheets",
                    analysis.workbook, analysis.summary.num_worksheets
                ),
                Some(err) => eprintln!("{}: ERROR {err}", analysis.workbook),
            }
        }
        workbooks.push(analysis);
    }

    let receipt = CorpusReceipt {
        schema_version: SCHEMA_VERSION,
        corpus: summarize_corpus(&workbooks),
        workbooks,
    };

    let format = args.effective_format();
    vizscore_format::write_corpus_receipt(&receipt, args.out.as_deref(), format)?;
    if let Some(out) = &args.out {
        println!(
            "Wrote {} workbook results to {}",
            receipt.workbooks.len(),
            out.display()
        );
    }
    Ok(())
}

fn analyze_file(path: &Path, config: &ScoreConfig) -> WorkbookAnalysis {
    let name = crate::source_name(path);
    let result = std::fs::read(path)
        .map_err(anyhow::Error::from)
        .and_then(|bytes| {
            crate::analyze_workbook_bytes(&bytes, &name, config).map_err(anyhow::Error::from)
        });
    match result {
        Ok(receipt) => WorkbookAnalysis {
            workbook: receipt.workbook,
            summary: receipt.summary,
            worksheets: receipt.worksheets,
            error: None,
        },
        Err(err) => WorkbookAnalysis {
            workbook: name,
            worksheets: vec![],
            summary: WorkbookSummary::default(),
            error: Some(format!("{err:#}")),
        },
    }
}

/// Collect `.twb`/`.twbx` files under `dir`, sorted by path.
fn collect_workbook_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                walk(&path, recursive, files)?;
            }
            continue;
        }
        let matches = path
            .extension()
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext == *w));
        if matches {
            files.push(path);
        }
    }
    Ok(())
}
