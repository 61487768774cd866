//! # vizscore-types
//!
//! **Tier 0 (Core Types)**
//!
//! This crate defines the core data structures and contracts for `vizscore`.
//! It contains only data types, Serde definitions, and `SCHEMA_VERSION`.
//!
//! ## Stability Policy
//!
//! **JSON-first stability**: the primary contract is the JSON schema, not
//! Rust struct literals.
//!
//! - **JSON consumers**: Stable. New fields have sensible defaults;
//!   removed/renamed fields bump `SCHEMA_VERSION`.
//! - **Rust library consumers**: Semi-stable. New fields may be added in
//!   minor versions, which can break struct literal construction. Use
//!   `Default` + field mutation or `..Default::default()` patterns for
//!   forward compatibility.
//!
//! ## What belongs here
//! * Pure data structs (records, summaries, receipts)
//! * Serialization/Deserialization logic
//! * Stability markers (SCHEMA_VERSION)
//!
//! ## What does NOT belong here
//! * File I/O
//! * CLI argument parsing
//! * Extraction or scoring logic

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// The current schema version for all receipt types.
pub const SCHEMA_VERSION: u32 = 1;

/// A calculated field attributed to a worksheet.
///
/// Owned by the worksheet that references it; immutable once extracted.
/// `formula` may be empty (a renamed/reference-only field), in which case
/// `formula_complexity` is 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculatedField {
    pub name: String,
    pub formula: String,
    pub formula_complexity: f64,
}

/// Per-worksheet extraction record plus its final complexity score.
///
/// The extractor populates every field except `complexity_score`, which
/// the scoring engine fills in. Aggregation only reads records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WorksheetRecord {
    /// Worksheet name (`name` attribute, falling back to `caption`).
    pub worksheet: String,
    /// Owning workbook display name (file name in directory mode).
    pub workbook: String,
    /// Detected mark/chart types, deduplicated, first-seen order.
    pub mark_types: Vec<String>,
    /// Distinct field references on the worksheet.
    pub num_fields_used: usize,
    /// Count of populated encoding channels (see `ScoreConfig::shelf_channels`).
    pub shelf_density: usize,
    pub num_dimensions_est: usize,
    pub num_measures_est: usize,
    pub num_filters: usize,
    /// Workbook-scope parameter count visible to this sheet.
    pub num_params_est: usize,
    /// True if any calculated field referenced by this worksheet uses a
    /// table-calc function.
    pub has_table_calc_ws: bool,
    /// True if any calculated field referenced by this worksheet uses a
    /// level-of-detail expression.
    pub has_lod_ws: bool,
    /// Calculated fields referenced by this worksheet, deduplicated by
    /// name, first-seen order.
    pub calculated_fields: Vec<CalculatedField>,
    pub calc_formula_complexity_total: f64,
    pub calc_formula_complexity_avg: f64,
    /// Weighted composite score; zero until the scoring engine runs.
    pub complexity_score: f64,
    /// Non-fatal missing-data notes recorded during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A `(mark, count)` histogram entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkCount {
    pub mark: String,
    pub count: usize,
}

/// Aggregate over all worksheets of one workbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WorkbookSummary {
    pub num_worksheets: usize,
    /// Mean worksheet score, 2-decimal rounded.
    pub overall_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub total_calc_fields: usize,
    pub formula_complexity_total: f64,
    /// `formula_complexity_total / total_calc_fields`, or 0 when there
    /// are no calculated fields.
    pub formula_complexity_avg: f64,
    /// Mark histogram, most frequent first, first-seen tie-break.
    pub top_mark_types: Vec<MarkCount>,
}

/// One workbook's full analysis in directory mode.
///
/// A file that fails extraction still yields an envelope: empty
/// worksheets, zeroed summary, and the error string. Batch runs never
/// abort on a single bad file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkbookAnalysis {
    pub workbook: String,
    pub worksheets: Vec<WorksheetRecord>,
    pub summary: WorkbookSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate over all workbooks of a directory run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CorpusSummary {
    pub num_workbooks: usize,
    pub total_worksheets: usize,
    pub overall_score_avg: f64,
    pub overall_score_min: f64,
    pub overall_score_max: f64,
    pub worksheet_complexity_avg: f64,
    pub worksheets_with_table_calc_pct: f64,
    pub worksheets_with_lod_pct: f64,
    pub formula_complexity_total: f64,
    pub formula_complexity_avg: f64,
    pub errors_count: usize,
    pub top_mark_types: Vec<MarkCount>,
}

/// Single-workbook receipt envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookReceipt {
    pub schema_version: u32,
    pub workbook: String,
    pub summary: WorkbookSummary,
    pub worksheets: Vec<WorksheetRecord>,
}

/// Directory-mode receipt envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusReceipt {
    pub schema_version: u32,
    pub corpus: CorpusSummary,
    pub workbooks: Vec<WorkbookAnalysis>,
}

/// Output format for receipt writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Tsv,
}
