//! Technical indicator implementations.
//!
//! Every indicator maps a series of length n to a `Vec<f64>` of length n.
//! Bars before an indicator's warm-up window is filled hold `f64::NAN`;
//! values are never dropped or shifted. NaN serializes as JSON `null`.

pub mod bollinger;
pub mod ema;
pub mod kdj;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{BollingerSeries, bollinger};
pub use ema::{ema, ema_com};
pub use kdj::{KdjSeries, kdj};
pub use macd::{MacdSeries, macd, macd_default};
pub use rolling::{rolling_max, rolling_min, window_max, window_min};
pub use rsi::rsi;
pub use sma::sma;
pub use stddev::{mean, rolling_std, sample_std};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::QuantError;
use crate::domain::ohlcv::{self, PriceBar};

/// Minimum number of bars `compute_indicators` accepts.
pub const MIN_INDICATOR_BARS: usize = 20;

/// The standard indicator panel over one price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
    pub ma5: Vec<f64>,
    pub ma10: Vec<f64>,
    pub ma20: Vec<f64>,
    pub ma60: Vec<f64>,
    pub rsi14: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,
    pub boll_upper: Vec<f64>,
    pub boll_middle: Vec<f64>,
    pub boll_lower: Vec<f64>,
    pub kdj_k: Vec<f64>,
    pub kdj_d: Vec<f64>,
    pub kdj_j: Vec<f64>,
    pub vol_ma5: Vec<f64>,
    pub vol_ma10: Vec<f64>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

pub fn compute_indicators(bars: &[PriceBar]) -> Result<IndicatorSet, QuantError> {
    if bars.len() < MIN_INDICATOR_BARS {
        return Err(QuantError::InsufficientData {
            bars: bars.len(),
            minimum: MIN_INDICATOR_BARS,
        });
    }

    let closes = ohlcv::closes(bars);
    let highs = ohlcv::highs(bars);
    let lows = ohlcv::lows(bars);
    let volumes = ohlcv::volumes(bars);

    let macd = macd_default(&closes);
    let boll = bollinger(&closes, bollinger::DEFAULT_PERIOD, bollinger::DEFAULT_NUM_STD);
    let kdj = kdj(&highs, &lows, &closes, kdj::DEFAULT_PERIOD);

    Ok(IndicatorSet {
        dates: bars.iter().map(|b| b.date).collect(),
        ma5: sma(&closes, 5),
        ma10: sma(&closes, 10),
        ma20: sma(&closes, 20),
        ma60: sma(&closes, 60),
        rsi14: rsi(&closes, rsi::DEFAULT_PERIOD),
        macd: macd.line,
        macd_signal: macd.signal,
        macd_hist: macd.histogram,
        boll_upper: boll.upper,
        boll_middle: boll.middle,
        boll_lower: boll.lower,
        kdj_k: kdj.k,
        kdj_d: kdj.d,
        kdj_j: kdj.j,
        vol_ma5: sma(&volumes, 5),
        vol_ma10: sma(&volumes, 10),
        closes,
        volumes,
    })
}
