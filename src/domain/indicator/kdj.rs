//! KDJ stochastic oscillator.
//!
//! RSV[i] = (C[i] - LL(n)) / (HH(n) - LL(n)) × 100, with the window
//! including bar i. A zero range gives RSV = 0.
//! K = EMA(RSV, com=2), D = EMA(K, com=2), J = 3K - 2D.
//! Warmup: first (n-1) values are NaN.

use serde::Serialize;

use super::ema::ema_com;
use super::rolling::{rolling_max, rolling_min};

pub const DEFAULT_PERIOD: usize = 9;
const SMOOTHING_COM: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KdjSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

pub fn kdj(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> KdjSeries {
    let hh = rolling_max(highs, period);
    let ll = rolling_min(lows, period);

    let rsv: Vec<f64> = closes
        .iter()
        .zip(hh.iter().zip(&ll))
        .map(|(&c, (&h, &l))| {
            if h.is_nan() || l.is_nan() {
                f64::NAN
            } else if h - l == 0.0 {
                0.0
            } else {
                (c - l) / (h - l) * 100.0
            }
        })
        .collect();

    let k = ema_com(&rsv, SMOOTHING_COM);
    let d = ema_com(&k, SMOOTHING_COM);
    let j = k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect();

    KdjSeries { k, d, j }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kdj_warmup() {
        let highs = [11.0, 12.0, 13.0, 14.0];
        let lows = [9.0, 10.0, 11.0, 12.0];
        let closes = [10.0, 11.0, 12.0, 13.0];
        let out = kdj(&highs, &lows, &closes, 3);
        assert!(out.k[0].is_nan());
        assert!(out.k[1].is_nan());
        assert!(!out.k[2].is_nan());
        assert!(out.j[1].is_nan());
    }

    #[test]
    fn kdj_first_value_seeds_on_rsv() {
        let highs = [11.0, 12.0, 13.0];
        let lows = [9.0, 10.0, 11.0];
        let closes = [10.0, 11.0, 12.0];
        let out = kdj(&highs, &lows, &closes, 3);
        // HH = 13, LL = 9, RSV = 3 / 4 * 100
        assert!((out.k[2] - 75.0).abs() < 1e-12);
        assert!((out.d[2] - 75.0).abs() < 1e-12);
        assert!((out.j[2] - 75.0).abs() < 1e-12);
    }

    #[test]
    fn kdj_smoothing_step() {
        let highs = [11.0, 12.0, 13.0, 14.0];
        let lows = [9.0, 10.0, 11.0, 12.0];
        let closes = [10.0, 11.0, 12.0, 10.0];
        let out = kdj(&highs, &lows, &closes, 3);
        // bar 3: HH = 14, LL = 10, RSV = 0
        let k3 = 75.0 * 2.0 / 3.0;
        let d3 = k3 / 3.0 + 75.0 * 2.0 / 3.0;
        assert!((out.k[3] - k3).abs() < 1e-12);
        assert!((out.d[3] - d3).abs() < 1e-12);
        assert!((out.j[3] - (3.0 * k3 - 2.0 * d3)).abs() < 1e-12);
    }

    #[test]
    fn kdj_zero_range_gives_zero_rsv() {
        let flat = [10.0; 5];
        let out = kdj(&flat, &flat, &flat, 3);
        assert!(out.k[4].abs() < f64::EPSILON);
        assert!(out.d[4].abs() < f64::EPSILON);
    }
}
