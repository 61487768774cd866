//! # vizscore-format
//!
//! **Tier 3 (Formatting)**
//!
//! Rendering and serialization of vizscore receipts. JSON receipts are
//! self-contained envelopes; CSV/TSV output follows the flat-row
//! convention: worksheet rows at the requested path, summary rows in a
//! `_summary`/`_summaries` sidecar next to it.
//!
//! ## What belongs here
//! * Serialization logic (JSON/CSV/TSV)
//! * Output file writing
//!
//! ## What does NOT belong here
//! * Business logic (extraction, scoring, aggregation)
//! * CLI arg parsing

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;

use vizscore_types::{
    CorpusReceipt, OutputFormat, WorkbookReceipt, WorkbookSummary, WorksheetRecord,
};

/// Flat worksheet row for tabular output. `mark_types` is `;`-joined so
/// the row stays one line per worksheet.
#[derive(Debug, Serialize)]
struct WorksheetRow<'a> {
    workbook: &'a str,
    worksheet: &'a str,
    mark_types: String,
    num_fields_used: usize,
    shelf_density: usize,
    num_dimensions_est: usize,
    num_measures_est: usize,
    num_filters: usize,
    num_params_est: usize,
    num_calculated_fields: usize,
    has_table_calc_ws: bool,
    has_lod_ws: bool,
    calc_formula_complexity_total: f64,
    calc_formula_complexity_avg: f64,
    complexity_score: f64,
}

impl<'a> From<&'a WorksheetRecord> for WorksheetRow<'a> {
    fn from(record: &'a WorksheetRecord) -> Self {
        Self {
            workbook: &record.workbook,
            worksheet: &record.worksheet,
            mark_types: record.mark_types.join(";"),
            num_fields_used: record.num_fields_used,
            shelf_density: record.shelf_density,
            num_dimensions_est: record.num_dimensions_est,
            num_measures_est: record.num_measures_est,
            num_filters: record.num_filters,
            num_params_est: record.num_params_est,
            num_calculated_fields: record.calculated_fields.len(),
            has_table_calc_ws: record.has_table_calc_ws,
            has_lod_ws: record.has_lod_ws,
            calc_formula_complexity_total: record.calc_formula_complexity_total,
            calc_formula_complexity_avg: record.calc_formula_complexity_avg,
            complexity_score: record.complexity_score,
        }
    }
}

/// Flat summary row for tabular output.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    workbook: &'a str,
    num_worksheets: usize,
    overall_score: f64,
    max_score: f64,
    min_score: f64,
    total_calc_fields: usize,
    formula_complexity_total: f64,
    formula_complexity_avg: f64,
    /// Empty for healthy workbooks; kept as a column so every row has
    /// the same shape.
    error: Option<&'a str>,
}

impl<'a> SummaryRow<'a> {
    fn new(workbook: &'a str, summary: &WorkbookSummary, error: Option<&'a str>) -> Self {
        Self {
            workbook,
            num_worksheets: summary.num_worksheets,
            overall_score: summary.overall_score,
            max_score: summary.max_score,
            min_score: summary.min_score,
            total_calc_fields: summary.total_calc_fields,
            formula_complexity_total: summary.formula_complexity_total,
            formula_complexity_avg: summary.formula_complexity_avg,
            error,
        }
    }
}

/// Write a single-workbook receipt.
///
/// JSON goes to `out` or stdout; CSV/TSV requires `out` and writes a
/// `_summary` sidecar next to it.
pub fn write_workbook_receipt(
    receipt: &WorkbookReceipt,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(receipt, out),
        OutputFormat::Csv | OutputFormat::Tsv => {
            let out = require_out(out, format)?;
            let rows: Vec<WorksheetRow<'_>> =
                receipt.worksheets.iter().map(WorksheetRow::from).collect();
            write_rows(out, delimiter(format), &rows)?;

            let sidecar = sidecar_path(out, "_summary");
            let summary = [SummaryRow::new(&receipt.workbook, &receipt.summary, None)];
            write_rows(&sidecar, delimiter(format), &summary)
        }
    }
}

/// Write a directory-mode receipt.
///
/// JSON goes to `out` or stdout; CSV/TSV writes all worksheet rows at
/// `out` and per-workbook summary rows (including error entries) in a
/// `_summaries` sidecar.
pub fn write_corpus_receipt(
    receipt: &CorpusReceipt,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(receipt, out),
        OutputFormat::Csv | OutputFormat::Tsv => {
            let out = require_out(out, format)?;
            let rows: Vec<WorksheetRow<'_>> = receipt
                .workbooks
                .iter()
                .flat_map(|wb| wb.worksheets.iter())
                .map(WorksheetRow::from)
                .collect();
            write_rows(out, delimiter(format), &rows)?;

            let sidecar = sidecar_path(out, "_summaries");
            let summaries: Vec<SummaryRow<'_>> = receipt
                .workbooks
                .iter()
                .map(|wb| SummaryRow::new(&wb.workbook, &wb.summary, wb.error.as_deref()))
                .collect();
            write_rows(&sidecar, delimiter(format), &summaries)
        }
    }
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize receipt")?;
    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(text.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn write_rows<T: Serialize>(path: &Path, delimiter: u8, rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("create output file {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn require_out(out: Option<&Path>, format: OutputFormat) -> Result<&Path> {
    match out {
        Some(path) => Ok(path),
        None => bail!("--out is required for {format:?} output"),
    }
}

fn delimiter(format: OutputFormat) -> u8 {
    match format {
        OutputFormat::Tsv => b'\t',
        _ => b',',
    }
}

/// `summary.csv` + `_summaries` -> `summary_summaries.csv`.
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => path.with_file_name(format!("{stem}{suffix}.{}", ext.to_string_lossy())),
        None => path.with_file_name(format!("{stem}{suffix}")),
    }
}
