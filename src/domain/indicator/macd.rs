//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Both EMAs are seeded with the first close, so every component is defined
//! from bar 0 onward.

use serde::Serialize;

use super::ema::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&line, signal);
    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| l - s)
        .collect();

    MacdSeries {
        line,
        signal: signal_line,
        histogram,
    }
}

pub fn macd_default(closes: &[f64]) -> MacdSeries {
    macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn macd_defined_from_first_bar() {
        let out = macd_default(&wave(40));
        assert_eq!(out.line.len(), 40);
        assert!(out.line.iter().all(|v| !v.is_nan()));
        assert!(out.signal.iter().all(|v| !v.is_nan()));
        assert!(out.line[0].abs() < f64::EPSILON);
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let out = macd_default(&wave(60));
        for i in 0..60 {
            assert!((out.histogram[i] - (out.line[i] - out.signal[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let closes = wave(30);
        let out = macd(&closes, 3, 6, 4);
        let fast = ema(&closes, 3);
        let slow = ema(&closes, 6);
        for i in 0..30 {
            assert!((out.line[i] - (fast[i] - slow[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let out = macd_default(&[50.0; 30]);
        assert!(out.histogram.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn macd_rising_series_is_positive() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let out = macd_default(&closes);
        assert!(out.line[49] > 0.0);
    }

    #[test]
    fn macd_empty() {
        let out = macd_default(&[]);
        assert!(out.line.is_empty());
        assert!(out.histogram.is_empty());
    }
}
