//! Rolling extremes over highs and lows.

/// Highest value over the trailing window ending at (and including) each bar.
/// Warmup: first (n-1) values are NaN.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_by(values, window, window_max)
}

/// Lowest value over the trailing window ending at (and including) each bar.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_by(values, window, window_min)
}

fn rolling_by(values: &[f64], window: usize, f: fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for i in (window.saturating_sub(1))..values.len() {
        out[i] = f(&values[i + 1 - window..=i]);
    }
    out
}

/// Maximum of a slice, NaN when empty.
pub fn window_max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::max)
}

/// Minimum of a slice, NaN when empty.
pub fn window_min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::min)
}
