//! Property-based tests for vizscore-math functions.

use proptest::prelude::*;
use vizscore_math::{mean, min_max, percentage, round_f64, safe_ratio};

proptest! {
    #[test]
    fn round_f64_is_idempotent(value in -1e9f64..1e9, decimals in 0u32..6) {
        let once = round_f64(value, decimals);
        let twice = round_f64(once, decimals);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn safe_ratio_never_panics(numer in -1e9f64..1e9, denom in -1e9f64..1e9) {
        let _ = safe_ratio(numer, denom);
    }

    #[test]
    fn mean_is_within_min_max(values in proptest::collection::vec(0.0f64..1e6, 1..50)) {
        let m = mean(&values);
        let (lo, hi) = min_max(&values).unwrap();
        // Rounding can shift the mean by at most half a cent.
        prop_assert!(m >= lo - 0.005 && m <= hi + 0.005);
    }

    #[test]
    fn min_max_ordering_holds(values in proptest::collection::vec(-1e6f64..1e6, 1..50)) {
        let (lo, hi) = min_max(&values).unwrap();
        prop_assert!(lo <= hi);
    }

    #[test]
    fn percentage_is_bounded_for_parts_of_whole(part in 0usize..1000, extra in 0usize..1000) {
        let whole = part + extra;
        let pct = percentage(part, whole);
        prop_assert!((0.0..=100.0).contains(&pct));
    }

    #[test]
    fn mean_is_permutation_invariant_for_exact_values(values in proptest::collection::vec(0u32..400, 1..30)) {
        // Quarter-integers are exactly representable, so summation order
        // cannot change the result.
        let values: Vec<f64> = values.into_iter().map(|v| v as f64 / 4.0).collect();
        let mut reversed = values.clone();
        reversed.reverse();
        prop_assert_eq!(mean(&values), mean(&reversed));
    }
}
