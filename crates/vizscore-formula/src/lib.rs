//! Lexical complexity analysis for Tableau calculated-field formulas.
//!
//! The analyzer is a structural heuristic, not an expression interpreter:
//! it counts operators, function calls, conditional branches, and LOD
//! openers in a single pass, and scales the sum by the deepest nesting
//! level it saw. Malformed text degrades to plain token counting; the
//! analyzer never fails.

#![forbid(unsafe_code)]

/// Weighted per-unit increments. Nesting multiplies instead of adding,
/// since deeply nested logic is disproportionately harder to audit.
const BASE_SCORE: f64 = 1.0;
const OPERATOR_WEIGHT: f64 = 0.5;
const FUNCTION_WEIGHT: f64 = 1.0;
const TABLE_CALC_WEIGHT: f64 = 2.0;
const LOD_WEIGHT: f64 = 2.0;
const BRANCH_WEIGHT: f64 = 1.0;
const DEPTH_FACTOR: f64 = 0.25;

/// Table-calc function name prefixes (family matches).
const TABLE_CALC_PREFIXES: [&str; 3] = ["WINDOW_", "RUNNING_", "MOVING_"];

/// Table-calc function names matched exactly.
const TABLE_CALC_NAMES: [&str; 9] = [
    "INDEX",
    "RANK",
    "RANK_DENSE",
    "PERCENTILE",
    "TOTAL",
    "LOOKUP",
    "FIRST",
    "LAST",
    "PREVIOUS_VALUE",
];

/// Level-of-detail scope keywords following `{`.
const LOD_KEYWORDS: [&str; 3] = ["FIXED", "INCLUDE", "EXCLUDE"];

/// Result of analyzing one formula expression.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FormulaAnalysis {
    pub complexity: f64,
    pub has_table_calc: bool,
    pub has_lod: bool,
}

/// Analyze a formula: complexity score plus table-calc / LOD flags.
///
/// Empty or whitespace-only formulas score 0. A bare field reference
/// (`[Sales]`) scores the minimal base value, since there is no such
/// thing as zero-cost logic once a calculated field exists.
#[must_use]
pub fn analyze(formula: &str) -> FormulaAnalysis {
    if formula.trim().is_empty() {
        return FormulaAnalysis::default();
    }
    let scan = scan(formula);
    let raw = BASE_SCORE
        + OPERATOR_WEIGHT * scan.operators as f64
        + FUNCTION_WEIGHT * scan.functions as f64
        + TABLE_CALC_WEIGHT * scan.table_calc_functions as f64
        + LOD_WEIGHT * scan.lod_openers as f64
        + BRANCH_WEIGHT * scan.branches as f64;
    FormulaAnalysis {
        complexity: round2(raw * (1.0 + DEPTH_FACTOR * scan.max_depth as f64)),
        has_table_calc: contains_table_calc(formula),
        has_lod: contains_lod(formula),
    }
}

/// Convenience wrapper returning only the score.
#[must_use]
pub fn complexity(formula: &str) -> f64 {
    analyze(formula).complexity
}

/// True if the expression uses a table-calc function.
#[must_use]
pub fn contains_table_calc(formula: &str) -> bool {
    let upper = formula.to_uppercase();
    TABLE_CALC_PREFIXES.iter().any(|p| upper.contains(p))
        || TABLE_CALC_NAMES
            .iter()
            .any(|n| upper.contains(&format!("{n}(")))
}

/// True if the expression opens a level-of-detail scope
/// (`{ FIXED ... }`, `{ INCLUDE ... }`, `{ EXCLUDE ... }`).
#[must_use]
pub fn contains_lod(formula: &str) -> bool {
    let chars: Vec<char> = formula.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let word: String = chars[j..]
                .iter()
                .take_while(|c| c.is_alphabetic())
                .collect::<String>()
                .to_uppercase();
            if LOD_KEYWORDS.contains(&word.as_str()) {
                return true;
            }
        }
        i += 1;
    }
    false
}

#[derive(Debug, Default)]
struct Scan {
    operators: usize,
    functions: usize,
    table_calc_functions: usize,
    lod_openers: usize,
    branches: usize,
    max_depth: usize,
}

fn is_table_calc_name(upper: &str) -> bool {
    TABLE_CALC_PREFIXES.iter().any(|p| upper.starts_with(p))
        || TABLE_CALC_NAMES.contains(&upper)
}

/// One pass over the formula text. String literals (`'...'`, `"..."`),
/// bracketed field references (`[Profit Margin]`), and `//` comments are
/// skipped so punctuation inside them does not count.
fn scan(formula: &str) -> Scan {
    let chars: Vec<char> = formula.chars().collect();
    let mut out = Scan::default();
    let mut paren_depth: usize = 0;
    let mut cond_depth: usize = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                i += 1;
                while i < chars.len() && chars[i] != c {
                    i += 1;
                }
                i += 1;
            }
            '[' => {
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '(' | '{' => {
                if c == '{' && lod_opener_at(&chars, i) {
                    out.lod_openers += 1;
                }
                paren_depth += 1;
                out.max_depth = out.max_depth.max(paren_depth + cond_depth);
                i += 1;
            }
            ')' | '}' => {
                paren_depth = paren_depth.saturating_sub(1);
                i += 1;
            }
            '+' | '-' | '*' | '/' | '%' | '=' => {
                out.operators += 1;
                i += 1;
            }
            '<' | '>' => {
                out.operators += 1;
                // `<=`, `>=`, and `<>` are single operators.
                if matches!(chars.get(i + 1), Some('=') | Some('>')) {
                    i += 1;
                }
                i += 1;
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect::<String>().to_uppercase();
                match word.as_str() {
                    "IF" => {
                        out.branches += 1;
                        cond_depth += 1;
                        out.max_depth = out.max_depth.max(paren_depth + cond_depth);
                    }
                    "CASE" => {
                        cond_depth += 1;
                        out.max_depth = out.max_depth.max(paren_depth + cond_depth);
                    }
                    "ELSEIF" | "WHEN" => out.branches += 1,
                    "END" => cond_depth = cond_depth.saturating_sub(1),
                    "AND" | "OR" | "NOT" => out.operators += 1,
                    "THEN" | "ELSE" => {}
                    _ => {
                        // Any other identifier followed by `(` is a call.
                        if next_nonspace(&chars, i) == Some('(') {
                            if is_table_calc_name(&word) {
                                out.table_calc_functions += 1;
                            } else {
                                out.functions += 1;
                            }
                        }
                    }
                }
            }
            _ => i += 1,
        }
    }
    out
}

fn lod_opener_at(chars: &[char], open: usize) -> bool {
    let mut j = open + 1;
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    let word: String = chars[j..]
        .iter()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_uppercase();
    LOD_KEYWORDS.contains(&word.as_str())
}

fn next_nonspace(chars: &[char], from: usize) -> Option<char> {
    chars[from..].iter().copied().find(|c| !c.is_whitespace())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_formula_scores_zero() {
        assert_eq!(analyze("").complexity, 0.0);
        assert_eq!(analyze("   \n\t ").complexity, 0.0);
    }

    #[test]
    fn bare_field_reference_scores_the_base() {
        let analysis = analyze("[Sales]");
        assert_eq!(analysis.complexity, BASE_SCORE);
        assert!(!analysis.has_table_calc);
        assert!(!analysis.has_lod);
    }

    #[test]
    fn conditional_with_table_calc_outranks_plain_reference() {
        let analysis = analyze("IF [Sales] > 100 THEN RUNNING_SUM([Profit]) ELSE 0 END");
        assert!(analysis.has_table_calc);
        assert!(!analysis.has_lod);
        assert!(analysis.complexity > analyze("[Sales]").complexity);
    }

    #[test]
    fn nested_conditionals_outrank_flat_conditionals() {
        let flat = analyze("IF [A] > 1 THEN 1 ELSE 0 END");
        let nested = analyze("IF [A] > 1 THEN IF [B] > 2 THEN 2 ELSE 1 END ELSE 0 END");
        assert!(nested.complexity > flat.complexity);
    }

    #[test]
    fn lod_expression_sets_the_flag() {
        let analysis = analyze("{ FIXED [Region] : SUM([Sales]) }");
        assert!(analysis.has_lod);
        assert!(!analysis.has_table_calc);
        assert!(analysis.complexity > BASE_SCORE);
    }

    #[test]
    fn lod_detection_tolerates_missing_space() {
        assert!(contains_lod("{FIXED [Region]: SUM([Sales])}"));
        assert!(contains_lod("{  include [Id] : AVG([X])}"));
        assert!(!contains_lod("{ [Region] }"));
    }

    #[test]
    fn operators_inside_string_literals_do_not_count() {
        let with_literal = analyze("'a+b*c' + [Sales]");
        let without = analyze("'abc' + [Sales]");
        assert_eq!(with_literal.complexity, without.complexity);
    }

    #[test]
    fn operators_inside_field_names_do_not_count() {
        assert_eq!(analyze("[Profit-Margin]").complexity, BASE_SCORE);
    }

    #[test]
    fn table_calc_prefix_families_are_detected() {
        assert!(contains_table_calc("WINDOW_AVG([Sales])"));
        assert!(contains_table_calc("running_sum([Profit])"));
        assert!(contains_table_calc("MOVING_AVERAGE([X], -2, 0)"));
        assert!(contains_table_calc("INDEX()"));
        assert!(!contains_table_calc("SUM([Sales])"));
    }

    #[test]
    fn rank_as_field_name_is_not_a_table_calc() {
        assert!(!contains_table_calc("[Rank] + 1"));
    }

    #[test]
    fn aggregate_function_counts_once() {
        // base 1 + one function, one paren level
        let analysis = analyze("SUM([Sales])");
        assert_eq!(analysis.complexity, round2((1.0 + 1.0) * 1.25));
    }

    #[test]
    fn comparison_operators_count_once_each() {
        // <> is one operator, not two
        let a = analyze("[A] <> [B]");
        let b = analyze("[A] = [B]");
        assert_eq!(a.complexity, b.complexity);
    }

    #[test]
    fn case_when_branches_count() {
        let analysis = analyze("CASE [Region] WHEN 'East' THEN 1 WHEN 'West' THEN 2 ELSE 0 END");
        // two WHEN branches
        assert!(analysis.complexity > analyze("CASE [Region] WHEN 'East' THEN 1 ELSE 0 END").complexity);
    }

    #[test]
    fn line_comments_are_ignored() {
        let commented = analyze("[Sales] // +++ not real operators\n+ [Profit]");
        let plain = analyze("[Sales] + [Profit]");
        assert_eq!(commented.complexity, plain.complexity);
    }
}
