use vizscore_formula::{analyze, complexity, contains_lod, contains_table_calc};

#[test]
fn given_empty_formula_when_analyzed_then_complexity_is_zero() {
    assert_eq!(complexity(""), 0.0);
}

#[test]
fn given_plain_reference_when_analyzed_then_base_complexity_is_returned() {
    assert_eq!(complexity("[Sales]"), 1.0);
}

#[test]
fn given_table_calc_formula_when_analyzed_then_flag_is_set() {
    let analysis = analyze("WINDOW_AVG(SUM([Sales]))");
    assert!(analysis.has_table_calc);
}

#[test]
fn given_lod_formula_when_analyzed_then_flag_is_set() {
    let analysis = analyze("{EXCLUDE [Date] : SUM([Quantity])}");
    assert!(analysis.has_lod);
}

#[test]
fn given_deeper_nesting_when_analyzed_then_score_grows() {
    let one = complexity("SUM([A])");
    let two = complexity("ABS(SUM([A]))");
    let three = complexity("ZN(ABS(SUM([A])))");
    assert!(two > one);
    assert!(three > two);
}

#[test]
fn given_unbalanced_text_when_analyzed_then_no_panic_occurs() {
    let _ = analyze("IF (((([Sales]");
    let _ = analyze(")))) END END END");
    let _ = analyze("'unterminated");
    let _ = analyze("[unterminated");
}
