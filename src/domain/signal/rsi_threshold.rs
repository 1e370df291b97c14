//! RSI threshold strategy.
//!
//! Buy when RSI drops below `oversold` while flat; sell when RSI rises above
//! `overbought` while long.

use super::{BarCheck, SignalEvent, gate_signals};
use crate::domain::indicator::rsi;
use crate::domain::ohlcv::{self, PriceBar};

pub fn signals(
    bars: &[PriceBar],
    period: usize,
    oversold: f64,
    overbought: f64,
) -> Vec<SignalEvent> {
    let values = rsi(&ohlcv::closes(bars), period);

    gate_signals(bars.len(), |i| {
        let v = values[i];
        if v.is_nan() {
            return BarCheck::WarmUp;
        }
        BarCheck::ready(
            (v < oversold).then(|| format!("RSI={:.1} below {} (oversold)", v, oversold)),
            (v > overbought).then(|| format!("RSI={:.1} above {} (overbought)", v, overbought)),
        )
    })
}
