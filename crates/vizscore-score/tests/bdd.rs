use vizscore_config::{ScoreConfig, ScoreConfigOverride};
use vizscore_score::{score_records, score_worksheet};
use vizscore_types::WorksheetRecord;

fn base_record() -> WorksheetRecord {
    WorksheetRecord {
        worksheet: "S".to_string(),
        workbook: "w.twb".to_string(),
        mark_types: vec!["text".to_string()],
        ..Default::default()
    }
}

#[test]
fn given_zeroed_weights_when_scoring_then_only_mark_bonus_remains() {
    let overrides: ScoreConfigOverride = serde_json::from_str(
        r#"{"weights": {
            "dims": 0.0, "meas": 0.0, "filters": 0.0, "calcs": 0.0,
            "table_calc": 0.0, "lod": 0.0, "params": 0.0,
            "shelf_density": 0.0, "calc_formula_complexity": 0.0
        }}"#,
    )
    .unwrap();
    let config = ScoreConfig::default().merged(overrides);

    let mut record = base_record();
    record.num_dimensions_est = 10;
    record.num_filters = 10;
    assert_eq!(score_worksheet(&record, &config), config.bonus_for("text"));
}

#[test]
fn given_heavier_weights_when_scoring_then_score_increases() {
    let default_score = score_worksheet(
        &{
            let mut r = base_record();
            r.num_filters = 2;
            r
        },
        &ScoreConfig::default(),
    );

    let overrides: ScoreConfigOverride =
        serde_json::from_str(r#"{"weights": {"filters": 5.0}}"#).unwrap();
    let heavy = ScoreConfig::default().merged(overrides);
    let heavy_score = score_worksheet(
        &{
            let mut r = base_record();
            r.num_filters = 2;
            r
        },
        &heavy,
    );
    assert!(heavy_score > default_score);
}

#[test]
fn given_a_batch_when_score_records_runs_then_every_record_is_filled() {
    let config = ScoreConfig::default();
    let mut records = vec![base_record(), base_record()];
    records[1].num_measures_est = 4;

    score_records(&mut records, &config);
    for record in &records {
        assert!(record.complexity_score > 0.0);
    }
    assert!(records[1].complexity_score > records[0].complexity_score);
}
