//! Deterministic numeric and statistical helpers.

#![forbid(unsafe_code)]

/// Round a floating point value to `decimals` decimal places.
#[must_use]
pub fn round_f64(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Return a 2-decimal ratio and guard division by zero.
#[must_use]
pub fn safe_ratio(numer: f64, denom: f64) -> f64 {
    if denom == 0.0 {
        0.0
    } else {
        round_f64(numer / denom, 2)
    }
}

/// Return the 2-decimal mean of a slice, 0 when empty.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round_f64(values.iter().sum::<f64>() / values.len() as f64, 2)
}

/// Return `(min, max)` over a slice, `None` when empty.
#[must_use]
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    let mut lo = first;
    let mut hi = first;
    for &v in &values[1..] {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    Some((lo, hi))
}

/// Return a 1-decimal percentage and guard division by zero.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round_f64(part as f64 / whole as f64 * 100.0, 1)
    }
}
