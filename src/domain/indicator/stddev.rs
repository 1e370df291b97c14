//! Rolling sample standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((V[j] - mean)^2 for j in i-n+1..=i) / (n - 1))
//! Warmup: first (n-1) values are NaN. Windows of size < 2 are always NaN.

pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window < 2 {
        return out;
    }

    for i in (window - 1)..values.len() {
        out[i] = sample_std(&values[i + 1 - window..=i]);
    }

    out
}

/// Sample (ddof = 1) standard deviation of a slice. NaN when fewer than two
/// values are present or any value is NaN.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
