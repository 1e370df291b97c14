//! RSI (Relative Strength Index).
//!
//! Uses simple rolling means of day-over-day gains and losses:
//! - avg_gain[i] = mean(max(C[j]-C[j-1], 0)) for j in i-n+1..=i
//! - avg_loss[i] = mean(max(C[j-1]-C[j], 0)) for j in i-n+1..=i
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n values are NaN (n deltas are needed for the first window).

pub const DEFAULT_PERIOD: usize = 14;

pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let mut gains = vec![0.0; closes.len()];
    let mut losses = vec![0.0; closes.len()];
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else if change < 0.0 {
            losses[i] = -change;
        }
    }

    let mut gain_sum: f64 = gains[1..=period].iter().sum();
    let mut loss_sum: f64 = losses[1..=period].iter().sum();

    for i in period..closes.len() {
        if i > period {
            gain_sum += gains[i] - gains[i - period];
            loss_sum += losses[i] - losses[i - period];
        }
        let avg_gain = gain_sum / period as f64;
        let avg_loss = loss_sum / period as f64;
        // sliding sums can leave a tiny negative residue
        out[i] = if avg_loss <= 1e-12 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain.max(0.0) / avg_loss)
        };
    }

    out
}
