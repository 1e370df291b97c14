//! Bollinger Bands.
//!
//! - Middle: SMA over n closes
//! - Upper: Middle + (num_std × StdDev)
//! - Lower: Middle - (num_std × StdDev)
//!
//! StdDev is the sample standard deviation (divides by N-1).
//! Default parameters: period=20, num_std=2.0
//! Warmup: first (period-1) values are NaN.

use serde::Serialize;

use super::sma::sma;
use super::stddev::rolling_std;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let middle = sma(closes, period);
    let std = rolling_std(closes, period);

    let upper = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m + num_std * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m - num_std * s)
        .collect();

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_warmup() {
        let out = bollinger(&[10.0, 20.0, 30.0, 40.0], 3, 2.0);
        assert!(out.upper[0].is_nan());
        assert!(out.middle[1].is_nan());
        assert!(out.lower[1].is_nan());
        assert!(!out.middle[2].is_nan());
    }

    #[test]
    fn bollinger_known_values() {
        let out = bollinger(&[10.0, 20.0, 30.0], 3, 2.0);
        // sample variance = (100 + 0 + 100) / 2
        let stddev = 100.0_f64.sqrt();
        assert!((out.middle[2] - 20.0).abs() < 1e-10);
        assert!((out.upper[2] - (20.0 + 2.0 * stddev)).abs() < 1e-10);
        assert!((out.lower[2] - (20.0 - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let out = bollinger(&[10.0, 20.0, 30.0], 3, 1.0);
        assert!((out.upper[2] - 30.0).abs() < 1e-10);
        assert!((out.lower[2] - 10.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let out = bollinger(&[12.0, 17.0, 11.0, 25.0, 19.0], 4, 2.0);
        for i in 3..5 {
            let up = out.upper[i] - out.middle[i];
            let down = out.middle[i] - out.lower[i];
            assert!((up - down).abs() < 1e-10);
        }
    }

    #[test]
    fn bollinger_flat_series_collapses() {
        let out = bollinger(&[5.0; 25], DEFAULT_PERIOD, DEFAULT_NUM_STD);
        assert!((out.upper[24] - 5.0).abs() < 1e-12);
        assert!((out.lower[24] - 5.0).abs() < 1e-12);
    }
}
