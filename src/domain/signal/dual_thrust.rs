//! Dual Thrust range breakout.
//!
//! Over the `lookback` bars strictly before bar i:
//! range = max(HH - LC, HC - LL), where HH/LL are the high/low extremes and
//! HC/LC the close extremes. Thresholds are anchored on bar i's open:
//! upper = open + k1·range, lower = open - k2·range.
//!
//! Bars 1..lookback-1 are warm-up; the first evaluated bar is `lookback`.

use super::{BarCheck, SignalEvent, gate_signals};
use crate::domain::indicator::{window_max, window_min};
use crate::domain::ohlcv::{self, PriceBar};

pub fn signals(bars: &[PriceBar], lookback: usize, k1: f64, k2: f64) -> Vec<SignalEvent> {
    let highs = ohlcv::highs(bars);
    let lows = ohlcv::lows(bars);
    let closes = ohlcv::closes(bars);

    gate_signals(bars.len(), |i| {
        if i < lookback {
            return BarCheck::WarmUp;
        }
        let window = (i - lookback)..i;
        let hh = window_max(&highs[window.clone()]);
        let ll = window_min(&lows[window.clone()]);
        let hc = window_max(&closes[window.clone()]);
        let lc = window_min(&closes[window]);
        let range = (hh - lc).max(hc - ll);

        let open = bars[i].open;
        let upper = open + k1 * range;
        let lower = open - k2 * range;
        let close = closes[i];

        BarCheck::ready(
            (close > upper).then(|| format!("close broke upper bound {:.2}", upper)),
            (close < lower).then(|| format!("close broke lower bound {:.2}", lower)),
        )
    })
}
