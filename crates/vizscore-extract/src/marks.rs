//! Mark/chart type resolution.
//!
//! Tableau's schema drifted across versions, so detection is an ordered
//! fallback chain: explicit mark attributes, then map markers, then
//! shelf-based inference, then `"unknown"`. Raw values are normalized
//! through a synonym table so legacy spellings collapse to one name.

use roxmltree::Node;

use crate::xml::{element_name, first_descendant, has_descendant};

pub(crate) const UNKNOWN_MARK: &str = "unknown";

/// Elements whose `type`/`mark` attribute names the mark type.
const MARK_BEARING_TAGS: [&str; 4] = ["mark", "marks", "style", "view"];

/// Detected mark types in first-seen order, plus whether shelf
/// inference had to run (explicit attributes were absent).
pub(crate) fn detect_mark_types(
    ws: Node<'_, '_>,
    worksheet_name: &str,
    field_refs: &[String],
) -> (Vec<String>, bool) {
    let mut marks: Vec<String> = Vec::new();
    for el in ws.descendants().filter(Node::is_element) {
        let tag = element_name(el);
        if MARK_BEARING_TAGS.contains(&tag) {
            if let Some(raw) = el.attribute("type").or_else(|| el.attribute("mark")) {
                push_mark(raw, &mut marks);
            }
        }
        if let Some(raw) = el.attribute("mark") {
            push_mark(raw, &mut marks);
        }
        if tag == "map" || tag == "layers" || el.attribute("map").is_some() {
            push_mark("map", &mut marks);
        }
    }

    if marks.is_empty() {
        let guess = infer(ws, worksheet_name, field_refs).unwrap_or(UNKNOWN_MARK);
        (vec![guess.to_string()], true)
    } else {
        (marks, false)
    }
}

fn push_mark(raw: &str, marks: &mut Vec<String>) {
    let mark = normalize(raw);
    if !mark.is_empty() && !marks.contains(&mark) {
        marks.push(mark);
    }
}

/// Lowercase, fold `_`/space to `-`, strip anything else, then map
/// legacy spellings onto canonical names.
pub(crate) fn normalize(raw: &str) -> String {
    let base: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || *c == '-')
        .collect();
    match base.as_str() {
        "circle" | "square" => "scatter".to_string(),
        "box" | "boxandwhisker" => "box-and-whisker".to_string(),
        _ => base,
    }
}

/// Shelf-based inference for worksheets that carry no mark attribute.
///
/// `None` means the worksheet offered no signal at all (no elements, no
/// field references); the caller falls back to `"unknown"`.
fn infer(ws: Node<'_, '_>, worksheet_name: &str, field_refs: &[String]) -> Option<&'static str> {
    if has_geographic_field(field_refs) {
        return Some("map");
    }

    let n_rows = axis_field_count(ws, "rows");
    let n_cols = axis_field_count(ws, "cols");

    if n_rows == 0 && n_cols == 0 {
        let name = worksheet_name.to_lowercase();
        if name.contains("text") {
            Some("text")
        } else if has_descendant(ws, "shape") {
            Some("shape")
        } else if has_descendant(ws, "color") && has_descendant(ws, "size") {
            Some("scatter")
        } else if !field_refs.is_empty() || has_any_element(ws) {
            // Populated worksheets with empty axes are KPI/text tables.
            Some("text")
        } else {
            None
        }
    } else {
        let tokens = field_refs.join(" ").to_lowercase();
        if ["bin(", "hist", "bucket"].iter().any(|t| tokens.contains(t)) {
            Some("histogram")
        } else if ["path", "index(", "running_", "window_"]
            .iter()
            .any(|t| tokens.contains(t))
        {
            Some("line")
        } else {
            Some("bar")
        }
    }
}

fn has_any_element(ws: Node<'_, '_>) -> bool {
    ws.descendants()
        .any(|n| n.is_element() && n.id() != ws.id())
}

/// Latitude/longitude-style field detection.
///
/// Whole-word matching for the short forms: a substring test would trip
/// on auto-generated names like `Calculation_12345`.
fn has_geographic_field(field_refs: &[String]) -> bool {
    field_refs.iter().any(|f| {
        let lower = f.to_lowercase();
        lower.contains("latitude")
            || lower.contains("longitude")
            || lower
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|word| matches!(word, "lat" | "lon" | "lng"))
    })
}

/// Count fields on an axis shelf: `column` children, or the shelf's
/// inline text expression when no child elements are present.
fn axis_field_count(ws: Node<'_, '_>, shelf: &str) -> usize {
    let Some(node) = first_descendant(ws, shelf) else {
        return 0;
    };
    let columns = node
        .descendants()
        .filter(|n| n.is_element() && element_name(*n) == "column")
        .count();
    if columns > 0 {
        columns
    } else if node.text().is_some_and(|t| !t.trim().is_empty()) {
        1
    } else {
        0
    }
}
