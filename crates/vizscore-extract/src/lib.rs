//! # vizscore-extract
//!
//! **Tier 2 (Extraction)**
//!
//! Turns raw workbook bytes (`.twb` XML or `.twbx` zip package) into
//! per-worksheet [`WorksheetRecord`]s with calculated fields resolved
//! and annotated. Tableau's XML schema is large and drifts across
//! versions, so every lookup is an ordered fallback chain rather than a
//! strict path; a worksheet missing an expected sub-element gets
//! defaults plus a recorded warning, and extraction continues. Only a
//! top-level unparseable document fails the file.
//!
//! The extractor fills every record field except `complexity_score`,
//! which belongs to the scoring engine.

#![forbid(unsafe_code)]

mod container;
mod marks;
mod xml;

use log::warn;
use roxmltree::{Document, Node};
use thiserror::Error;

use vizscore_config::ScoreConfig;
use vizscore_math::round_f64;
use vizscore_types::{CalculatedField, WorksheetRecord};
use xml::{element_name, strip_brackets};

/// Extraction failure for one input file.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Input is neither a zip package nor well-formed XML.
    #[error("unsupported format: input is neither a zip package nor well-formed XML")]
    UnsupportedFormat,
    /// Zip package contains no `.twb` entry.
    #[error("no .twb workbook entry found inside the package")]
    NoWorkbookEntry,
    /// Zip container could not be read.
    #[error("zip container: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// Packaged workbook XML is corrupt.
    #[error("workbook xml: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A workbook-scope calculated field before worksheet attribution.
#[derive(Debug, Clone)]
struct WorkbookCalc {
    /// Display name (`caption` when present, else `name`), brackets
    /// stripped.
    display_name: String,
    /// Internal column name, kept for reference matching (worksheets
    /// reference columns by `name`, not caption).
    raw_name: Option<String>,
    formula: String,
    analysis: vizscore_formula::FormulaAnalysis,
    /// Worksheet the declaration sits inside, for inline calcs.
    declared_in: Option<String>,
}

/// Extract all worksheet records from one workbook file.
///
/// `source_name` is the display name recorded on every record (the file
/// name in directory mode). Records come back in document order with
/// `complexity_score` left at zero.
pub fn extract_workbook(
    bytes: &[u8],
    source_name: &str,
    config: &ScoreConfig,
) -> Result<Vec<WorksheetRecord>, ExtractError> {
    let (xml_text, packaged) = container::workbook_xml(bytes)?;
    let doc = match Document::parse(&xml_text) {
        Ok(doc) => doc,
        // Raw (non-package) input that does not parse is not a workbook
        // at all; a packaged .twb that does not parse is a corrupt one.
        Err(_) if !packaged => return Err(ExtractError::UnsupportedFormat),
        Err(err) => return Err(ExtractError::Xml(err)),
    };
    let root = doc.root_element();

    let params = workbook_parameters(root);
    let calcs = workbook_calculations(root);

    let records = worksheet_nodes(root)
        .into_iter()
        .map(|ws| extract_worksheet(ws, source_name, config, &calcs, params.len()))
        .collect();
    Ok(records)
}

/// Worksheet-defining elements, primary path first.
///
/// Primary: `worksheet` children of a `worksheets` container. Fallback
/// for older files: any `worksheet` element in the document. A workbook
/// with no worksheets is valid and yields no records.
fn worksheet_nodes<'a, 'input>(root: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    let primary: Vec<Node<'a, 'input>> = root
        .descendants()
        .filter(|n| n.is_element() && element_name(*n) == "worksheet")
        .filter(|n| {
            n.parent()
                .is_some_and(|p| p.is_element() && element_name(p) == "worksheets")
        })
        .collect();
    if !primary.is_empty() {
        return primary;
    }
    root.descendants()
        .filter(|n| n.is_element() && element_name(*n) == "worksheet")
        .collect()
}

/// Workbook-level parameter names, deduplicated and sorted.
fn workbook_parameters(root: Node<'_, '_>) -> Vec<String> {
    let mut names: Vec<String> = root
        .descendants()
        .filter(|n| n.is_element() && element_name(*n) == "parameter")
        .filter(|n| {
            n.parent()
                .is_some_and(|p| p.is_element() && element_name(p) == "parameters")
        })
        .filter_map(|n| n.attribute("name"))
        .map(|n| strip_brackets(n).to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Resolve calculated fields workbook-wide.
///
/// Calculated fields are typically declared once at workbook scope
/// (datasource columns carrying a `calculation` child), then referenced
/// by multiple worksheets. Deduplicated by display name, first-seen
/// order.
fn workbook_calculations(root: Node<'_, '_>) -> Vec<WorkbookCalc> {
    let mut calcs: Vec<WorkbookCalc> = Vec::new();
    for column in root
        .descendants()
        .filter(|n| n.is_element() && element_name(*n) == "column")
    {
        let Some(formula) = column_formula(column) else {
            continue;
        };
        let caption = column.attribute("caption");
        let raw_name = column.attribute("name").map(|n| strip_brackets(n).to_string());
        let Some(display) = caption.or_else(|| column.attribute("name")) else {
            continue;
        };
        let display_name = strip_brackets(display).to_string();
        if calcs.iter().any(|c| c.display_name == display_name) {
            continue;
        }
        calcs.push(WorkbookCalc {
            display_name,
            raw_name,
            analysis: vizscore_formula::analyze(&formula),
            formula,
            declared_in: enclosing_worksheet(column),
        });
    }
    calcs
}

/// Formula for a column, if it declares a calculation.
///
/// Tableau stores the expression in the `calculation` child's `formula`
/// attribute (or text content); a `formula` attribute directly on the
/// column is a rarer legacy form. A calculation element with no
/// expression still counts, with an empty formula.
fn column_formula(column: Node<'_, '_>) -> Option<String> {
    for child in column.children().filter(Node::is_element) {
        if element_name(child) == "calculation" {
            let formula = child
                .attribute("formula")
                .map(str::to_string)
                .or_else(|| child.text().map(|t| t.trim().to_string()))
                .unwrap_or_default();
            return Some(formula);
        }
    }
    column.attribute("formula").map(str::to_string)
}

fn enclosing_worksheet(node: Node<'_, '_>) -> Option<String> {
    node.ancestors()
        .filter(Node::is_element)
        .find(|n| element_name(*n) == "worksheet")
        .and_then(worksheet_name)
}

fn worksheet_name(ws: Node<'_, '_>) -> Option<String> {
    ws.attribute("name")
        .or_else(|| ws.attribute("caption"))
        .map(str::to_string)
}

fn extract_worksheet(
    ws: Node<'_, '_>,
    source_name: &str,
    config: &ScoreConfig,
    workbook_calcs: &[WorkbookCalc],
    num_params: usize,
) -> WorksheetRecord {
    let mut warnings: Vec<String> = Vec::new();

    let name = match worksheet_name(ws) {
        Some(name) => name,
        None => {
            warn!("{source_name}: worksheet has no name or caption attribute");
            warnings.push("worksheet name missing; using placeholder".to_string());
            "(unnamed)".to_string()
        }
    };

    let field_refs = field_references(ws);
    if field_refs.is_empty() {
        warnings.push("no field references found".to_string());
    }

    let (mark_types, inferred) = marks::detect_mark_types(ws, &name, &field_refs);
    if inferred {
        if mark_types == [marks::UNKNOWN_MARK] {
            warn!("{source_name}/{name}: mark type undetectable");
            warnings.push("mark type undetectable; defaulting to unknown".to_string());
        } else {
            warnings.push("mark type inferred from shelves".to_string());
        }
    }

    let (num_dimensions_est, num_measures_est) = role_counts(ws);
    let num_filters = count_elements(ws, "filter");
    let shelf_density = shelf_density(ws, &config.shelf_channels);

    let calculated_fields = attribute_calculations(&name, &field_refs, workbook_calcs);
    let has_table_calc_ws = calculated_fields
        .iter()
        .any(|(_, analysis)| analysis.has_table_calc);
    let has_lod_ws = calculated_fields.iter().any(|(_, analysis)| analysis.has_lod);

    let calculated_fields: Vec<CalculatedField> =
        calculated_fields.into_iter().map(|(field, _)| field).collect();
    let calc_formula_complexity_total = round_f64(
        calculated_fields
            .iter()
            .map(|c| c.formula_complexity)
            .sum(),
        2,
    );
    let calc_formula_complexity_avg = if calculated_fields.is_empty() {
        0.0
    } else {
        round_f64(
            calc_formula_complexity_total / calculated_fields.len() as f64,
            2,
        )
    };

    WorksheetRecord {
        worksheet: name,
        workbook: source_name.to_string(),
        mark_types,
        num_fields_used: field_refs.len(),
        shelf_density,
        num_dimensions_est,
        num_measures_est,
        num_filters,
        num_params_est: num_params,
        has_table_calc_ws,
        has_lod_ws,
        calculated_fields,
        calc_formula_complexity_total,
        calc_formula_complexity_avg,
        complexity_score: 0.0,
        warnings,
    }
}

/// Distinct field names referenced by the worksheet's pills/columns,
/// brackets stripped, first-seen order.
fn field_references(ws: Node<'_, '_>) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for col in ws
        .descendants()
        .filter(|n| n.is_element() && element_name(*n) == "column")
    {
        let Some(field) = col.attribute("field").or_else(|| col.attribute("name")) else {
            continue;
        };
        let field = strip_brackets(field).to_string();
        if !field.is_empty() && !refs.contains(&field) {
            refs.push(field);
        }
    }
    refs
}

/// Dimension/measure estimates from explicit `role` attributes only.
/// Fields with no role attribute are excluded from both counts, never
/// guessed.
fn role_counts(ws: Node<'_, '_>) -> (usize, usize) {
    let mut dims = 0;
    let mut meas = 0;
    for col in ws
        .descendants()
        .filter(|n| n.is_element() && element_name(*n) == "column")
    {
        match col.attribute("role") {
            Some("dimension") => dims += 1,
            Some("measure") => meas += 1,
            _ => {}
        }
    }
    (dims, meas)
}

fn count_elements(ws: Node<'_, '_>, name: &str) -> usize {
    ws.descendants()
        .filter(|n| n.is_element() && element_name(*n) == name)
        .count()
}

/// Count distinct populated channels from the configured channel set.
///
/// A channel is populated when an element of that name carries a field
/// (attribute, child element, or inline text), or when an `encoding`
/// element binds a field to it. Unrecognized channel names are ignored.
fn shelf_density(ws: Node<'_, '_>, channels: &[String]) -> usize {
    let mut hit: Vec<&str> = Vec::new();
    for el in ws.descendants().filter(Node::is_element) {
        let tag = element_name(el);
        if tag == "encoding" {
            if let Some(channel) = el.attribute("attr").or_else(|| el.attribute("class")) {
                if el.attribute("field").is_some() || el.attribute("column").is_some() {
                    record_channel(channel, channels, &mut hit);
                }
            }
            continue;
        }
        if element_populated(el) {
            record_channel(tag, channels, &mut hit);
        }
    }
    hit.len()
}

fn record_channel<'a>(channel: &str, channels: &'a [String], hit: &mut Vec<&'a str>) {
    if let Some(known) = channels.iter().find(|c| c.as_str() == channel) {
        if !hit.contains(&known.as_str()) {
            hit.push(known.as_str());
        }
    }
}

fn element_populated(el: Node<'_, '_>) -> bool {
    el.attribute("field").is_some()
        || el.attribute("column").is_some()
        || el.children().any(|c| c.is_element())
        || el.text().is_some_and(|t| !t.trim().is_empty())
}

/// Attribute workbook-scope calculated fields to one worksheet.
///
/// A field belongs to the worksheet when the worksheet references its
/// display or internal name, or when it was declared inline within the
/// worksheet. Deduplicated by display name, first-seen order.
fn attribute_calculations(
    worksheet_name: &str,
    field_refs: &[String],
    workbook_calcs: &[WorkbookCalc],
) -> Vec<(CalculatedField, vizscore_formula::FormulaAnalysis)> {
    let mut out: Vec<(CalculatedField, vizscore_formula::FormulaAnalysis)> = Vec::new();
    for calc in workbook_calcs {
        let referenced = field_refs.iter().any(|r| {
            r == &calc.display_name || calc.raw_name.as_deref().is_some_and(|raw| r == raw)
        });
        let inline = calc
            .declared_in
            .as_deref()
            .is_some_and(|declared| declared == worksheet_name);
        if !(referenced || inline) {
            continue;
        }
        if out.iter().any(|(f, _)| f.name == calc.display_name) {
            continue;
        }
        out.push((
            CalculatedField {
                name: calc.display_name.clone(),
                formula: calc.formula.clone(),
                formula_complexity: calc.analysis.complexity,
            },
            calc.analysis,
        ));
    }
    out
}
