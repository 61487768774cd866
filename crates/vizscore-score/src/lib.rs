//! Weighted complexity scoring for worksheet records.
//!
//! The score is a linear combination of extraction signals plus the
//! mean mark-type bonus, entirely driven by [`ScoreConfig`]. It is a
//! pure function of `(record, config)`: identical inputs yield a
//! bit-identical score.

#![forbid(unsafe_code)]

use vizscore_config::ScoreConfig;
use vizscore_math::round_f64;
use vizscore_types::WorksheetRecord;

/// Compute the composite complexity score for one record.
///
/// The result is non-negative (given non-negative weights) with no
/// upper bound; callers interpret magnitude relatively. Unknown mark
/// types resolve through the config's `"unknown"` bonus entry, never
/// zero and never an error.
#[must_use]
pub fn score_worksheet(record: &WorksheetRecord, config: &ScoreConfig) -> f64 {
    let w = &config.weights;
    let mut score = w.dims * record.num_dimensions_est as f64
        + w.meas * record.num_measures_est as f64
        + w.filters * record.num_filters as f64
        + w.calcs * record.calculated_fields.len() as f64
        + w.table_calc * f64::from(u8::from(record.has_table_calc_ws))
        + w.lod * f64::from(u8::from(record.has_lod_ws))
        + w.params * record.num_params_est as f64
        + w.shelf_density * record.shelf_density as f64
        + w.calc_formula_complexity * record.calc_formula_complexity_total;
    score += mark_bonus(record, config);
    round_f64(score, 2)
}

/// Mean bonus across detected mark types.
fn mark_bonus(record: &WorksheetRecord, config: &ScoreConfig) -> f64 {
    if record.mark_types.is_empty() {
        return 0.0;
    }
    let total: f64 = record
        .mark_types
        .iter()
        .map(|mark| config.bonus_for(mark))
        .sum();
    total / record.mark_types.len() as f64
}

/// Fill `complexity_score` on every record in place.
pub fn score_records(records: &mut [WorksheetRecord], config: &ScoreConfig) {
    for record in records {
        record.complexity_score = score_worksheet(record, config);
    }
}
