//! # vizscore-model
//!
//! **Tier 3 (Aggregation)**
//!
//! Deterministic reductions from worksheet records into workbook and
//! corpus summaries. Both reductions are total over empty input (zeroed
//! summaries, never NaN) and only ever read records.
//!
//! The mark histogram sorts by descending count with first-seen order
//! breaking ties: the first-seen index is captured at insertion time
//! rather than relying on incidental container iteration order, so
//! report output is reproducible run to run.

#![forbid(unsafe_code)]

use vizscore_math::{mean, min_max, percentage, round_f64, safe_ratio};
use vizscore_types::{CorpusSummary, MarkCount, WorkbookAnalysis, WorkbookSummary, WorksheetRecord};

/// How many histogram entries a corpus summary keeps.
const CORPUS_TOP_MARKS: usize = 10;

/// Mark-type tally with stable first-seen tie-breaking.
#[derive(Debug, Default)]
pub struct MarkTally {
    // (mark, count, first_seen)
    entries: Vec<(String, usize, usize)>,
}

impl MarkTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mark: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(m, _, _)| m == mark) {
            entry.1 += 1;
        } else {
            let first_seen = self.entries.len();
            self.entries.push((mark.to_string(), 1, first_seen));
        }
    }

    /// Descending by count, ties in first-seen order. `top == 0` keeps
    /// everything.
    #[must_use]
    pub fn into_top(mut self, top: usize) -> Vec<MarkCount> {
        self.entries
            .sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
        if top > 0 {
            self.entries.truncate(top);
        }
        self.entries
            .into_iter()
            .map(|(mark, count, _)| MarkCount { mark, count })
            .collect()
    }
}

/// Reduce one workbook's records into a summary.
#[must_use]
pub fn summarize_workbook(records: &[WorksheetRecord]) -> WorkbookSummary {
    if records.is_empty() {
        return WorkbookSummary::default();
    }

    let scores: Vec<f64> = records.iter().map(|r| r.complexity_score).collect();
    let (min_score, max_score) = min_max(&scores).unwrap_or((0.0, 0.0));

    let total_calc_fields: usize = records.iter().map(|r| r.calculated_fields.len()).sum();
    let formula_complexity_total = round_f64(
        records
            .iter()
            .map(|r| r.calc_formula_complexity_total)
            .sum(),
        2,
    );

    let mut tally = MarkTally::new();
    for record in records {
        for mark in &record.mark_types {
            tally.add(mark);
        }
    }

    WorkbookSummary {
        num_worksheets: records.len(),
        overall_score: mean(&scores),
        max_score,
        min_score,
        total_calc_fields,
        formula_complexity_total,
        formula_complexity_avg: safe_ratio(formula_complexity_total, total_calc_fields as f64),
        top_mark_types: tally.into_top(0),
    }
}

/// Reduce a directory run into a corpus summary.
///
/// Workbooks that failed extraction contribute to `errors_count` only;
/// their zeroed summaries are excluded from the score aggregates so a
/// corrupt file cannot drag the corpus average down.
#[must_use]
pub fn summarize_corpus(analyses: &[WorkbookAnalysis]) -> CorpusSummary {
    if analyses.is_empty() {
        return CorpusSummary::default();
    }

    let errors_count = analyses.iter().filter(|a| a.error.is_some()).count();
    let overall_scores: Vec<f64> = analyses
        .iter()
        .filter(|a| a.error.is_none())
        .map(|a| a.summary.overall_score)
        .collect();
    let (overall_score_min, overall_score_max) = min_max(&overall_scores).unwrap_or((0.0, 0.0));

    let worksheets: Vec<&WorksheetRecord> =
        analyses.iter().flat_map(|a| a.worksheets.iter()).collect();
    let total_worksheets = worksheets.len();
    let worksheet_scores: Vec<f64> = worksheets.iter().map(|w| w.complexity_score).collect();

    let with_table_calc = worksheets.iter().filter(|w| w.has_table_calc_ws).count();
    let with_lod = worksheets.iter().filter(|w| w.has_lod_ws).count();

    let total_calc_fields: usize = worksheets.iter().map(|w| w.calculated_fields.len()).sum();
    let formula_complexity_total = round_f64(
        worksheets
            .iter()
            .map(|w| w.calc_formula_complexity_total)
            .sum(),
        2,
    );

    let mut tally = MarkTally::new();
    for worksheet in &worksheets {
        for mark in &worksheet.mark_types {
            tally.add(mark);
        }
    }

    CorpusSummary {
        num_workbooks: analyses.len(),
        total_worksheets,
        overall_score_avg: mean(&overall_scores),
        overall_score_min,
        overall_score_max,
        worksheet_complexity_avg: mean(&worksheet_scores),
        worksheets_with_table_calc_pct: percentage(with_table_calc, total_worksheets),
        worksheets_with_lod_pct: percentage(with_lod, total_worksheets),
        formula_complexity_total,
        formula_complexity_avg: safe_ratio(formula_complexity_total, total_calc_fields as f64),
        errors_count,
        top_mark_types: tally.into_top(CORPUS_TOP_MARKS),
    }
}

#[cfg(test)]
mod tests {
    use vizscore_types::CalculatedField;

    use super::*;

    fn record(name: &str, score: f64, marks: &[&str]) -> WorksheetRecord {
        WorksheetRecord {
            worksheet: name.to_string(),
            workbook: "w.twb".to_string(),
            mark_types: marks.iter().map(|m| m.to_string()).collect(),
            complexity_score: score,
            ..Default::default()
        }
    }

    #[test]
    fn empty_workbook_summarizes_to_zeros() {
        let summary = summarize_workbook(&[]);
        assert_eq!(summary.num_worksheets, 0);
        assert_eq!(summary.overall_score, 0.0);
        assert_eq!(summary.min_score, 0.0);
        assert_eq!(summary.formula_complexity_avg, 0.0);
        assert!(summary.top_mark_types.is_empty());
    }

    #[test]
    fn summary_scores_match_hand_computed_values() {
        let records = vec![
            record("A", 2.0, &["bar"]),
            record("B", 4.0, &["line"]),
            record("C", 6.0, &["bar"]),
        ];
        let summary = summarize_workbook(&records);
        assert_eq!(summary.num_worksheets, 3);
        assert_eq!(summary.overall_score, 4.0);
        assert_eq!(summary.min_score, 2.0);
        assert_eq!(summary.max_score, 6.0);
    }

    #[test]
    fn histogram_sorts_by_count_then_first_seen() {
        let records = vec![
            record("A", 1.0, &["line", "bar"]),
            record("B", 1.0, &["map"]),
            record("C", 1.0, &["bar"]),
        ];
        let summary = summarize_workbook(&records);
        let marks: Vec<(&str, usize)> = summary
            .top_mark_types
            .iter()
            .map(|m| (m.mark.as_str(), m.count))
            .collect();
        // bar leads on count; line and map tie at 1 and keep first-seen order
        assert_eq!(marks, vec![("bar", 2), ("line", 1), ("map", 1)]);
    }

    #[test]
    fn calc_totals_roll_up() {
        let mut a = record("A", 1.0, &["bar"]);
        a.calculated_fields = vec![CalculatedField {
            name: "X".to_string(),
            formula: "[A]+[B]".to_string(),
            formula_complexity: 1.5,
        }];
        a.calc_formula_complexity_total = 1.5;
        let mut b = record("B", 1.0, &["bar"]);
        b.calculated_fields = vec![
            CalculatedField {
                name: "Y".to_string(),
                formula: "[C]".to_string(),
                formula_complexity: 1.0,
            },
            CalculatedField {
                name: "Z".to_string(),
                formula: "[D]*2".to_string(),
                formula_complexity: 1.5,
            },
        ];
        b.calc_formula_complexity_total = 2.5;

        let summary = summarize_workbook(&[a, b]);
        assert_eq!(summary.total_calc_fields, 3);
        assert_eq!(summary.formula_complexity_total, 4.0);
        assert_eq!(summary.formula_complexity_avg, 1.33);
    }

    #[test]
    fn empty_corpus_summarizes_to_zeros() {
        let corpus = summarize_corpus(&[]);
        assert_eq!(corpus.num_workbooks, 0);
        assert_eq!(corpus.total_worksheets, 0);
        assert_eq!(corpus.overall_score_avg, 0.0);
        assert_eq!(corpus.worksheets_with_table_calc_pct, 0.0);
        assert_eq!(corpus.errors_count, 0);
    }

    #[test]
    fn errored_workbooks_count_but_do_not_skew_scores() {
        let good = WorkbookAnalysis {
            workbook: "good.twb".to_string(),
            worksheets: vec![record("A", 8.0, &["bar"])],
            summary: summarize_workbook(&[record("A", 8.0, &["bar"])]),
            error: None,
        };
        let bad = WorkbookAnalysis {
            workbook: "bad.twb".to_string(),
            worksheets: vec![],
            summary: WorkbookSummary::default(),
            error: Some("unsupported format".to_string()),
        };

        let corpus = summarize_corpus(&[good, bad]);
        assert_eq!(corpus.num_workbooks, 2);
        assert_eq!(corpus.errors_count, 1);
        assert_eq!(corpus.overall_score_avg, 8.0);
        assert_eq!(corpus.overall_score_min, 8.0);
    }

    #[test]
    fn table_calc_percentage_counts_worksheets() {
        let mut flagged = record("A", 1.0, &["bar"]);
        flagged.has_table_calc_ws = true;
        let plain = record("B", 1.0, &["bar"]);

        let analysis = WorkbookAnalysis {
            workbook: "w.twb".to_string(),
            summary: summarize_workbook(&[flagged.clone(), plain.clone()]),
            worksheets: vec![flagged, plain],
            error: None,
        };
        let corpus = summarize_corpus(&[analysis]);
        assert_eq!(corpus.worksheets_with_table_calc_pct, 50.0);
        assert_eq!(corpus.worksheets_with_lod_pct, 0.0);
    }
}
