//! Exponential moving averages.
//!
//! Recursive form, seeded with the first defined value:
//! EMA[0] = V[0], EMA[i] = alpha*V[i] + (1-alpha)*EMA[i-1].
//! Leading NaN inputs stay NaN; the first defined input becomes the seed.

/// EMA with `alpha = 2 / (span + 1)`.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }
    ewm(values, 2.0 / (span as f64 + 1.0))
}

/// EMA with `alpha = 1 / (1 + com)`, the centre-of-mass form used by KDJ.
pub fn ema_com(values: &[f64], com: f64) -> Vec<f64> {
    ewm(values, 1.0 / (1.0 + com))
}

fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &v in values {
        let next = match (prev, v.is_nan()) {
            (None, true) => None,
            (None, false) => Some(v),
            // gaps carry the previous average forward
            (Some(p), true) => Some(p),
            (Some(p), false) => Some(alpha * v + (1.0 - alpha) * p),
        };
        out.push(next.unwrap_or(f64::NAN));
        prev = next;
    }

    out
}
