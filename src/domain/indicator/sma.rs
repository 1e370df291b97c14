//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(V[i-n+1..=i]), computed with a sliding sum.
//! Warmup: first (n-1) values are NaN. A window containing NaN yields NaN.

pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }

    let mut sum = 0.0;
    let mut nan_count = 0usize;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            nan_count += 1;
        } else {
            sum += v;
        }

        if i >= window {
            let old = values[i - window];
            if old.is_nan() {
                nan_count -= 1;
            } else {
                sum -= old;
            }
        }

        if i + 1 >= window && nan_count == 0 {
            out[i] = sum / window as f64;
        }
    }

    out
}
