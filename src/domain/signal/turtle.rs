//! Turtle channel breakout.
//!
//! Buy when the close exceeds the highest high of the previous
//! `entry_period` bars while flat. Sell when the close falls below the lowest
//! low of the previous `exit_period` bars while long. Bars before
//! `entry_period` are warm-up.

use super::{BarCheck, SignalEvent, gate_signals};
use crate::domain::indicator::{window_max, window_min};
use crate::domain::ohlcv::{self, PriceBar};

pub fn signals(bars: &[PriceBar], entry_period: usize, exit_period: usize) -> Vec<SignalEvent> {
    let highs = ohlcv::highs(bars);
    let lows = ohlcv::lows(bars);

    gate_signals(bars.len(), |i| {
        if i < entry_period {
            return BarCheck::WarmUp;
        }
        let entry_high = window_max(&highs[i - entry_period..i]);
        let exit_low = window_min(&lows[i.saturating_sub(exit_period)..i]);
        let close = bars[i].close;

        BarCheck::ready(
            (close > entry_high).then(|| {
                format!("broke {}-day high {:.2}", entry_period, entry_high)
            }),
            (close < exit_low)
                .then(|| format!("fell below {}-day low {:.2}", exit_period, exit_low)),
        )
    })
}
