//! Bollinger band breakout (mean reversion).
//!
//! Buy when the close falls below the lower band while flat; sell when the
//! close rises above the upper band while long.

use super::{BarCheck, SignalEvent, gate_signals};
use crate::domain::indicator::bollinger;
use crate::domain::ohlcv::{self, PriceBar};

pub fn signals(bars: &[PriceBar], period: usize, num_std: f64) -> Vec<SignalEvent> {
    let closes = ohlcv::closes(bars);
    let bands = bollinger(&closes, period, num_std);

    gate_signals(bars.len(), |i| {
        let (price, upper, lower) = (closes[i], bands.upper[i], bands.lower[i]);
        if upper.is_nan() || lower.is_nan() {
            return BarCheck::WarmUp;
        }
        BarCheck::ready(
            (price < lower)
                .then(|| format!("price {:.2} touched lower band {:.2}", price, lower)),
            (price > upper)
                .then(|| format!("price {:.2} touched upper band {:.2}", price, upper)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::SignalKind;
    use crate::domain::signal::test_support::make_bars;

    #[test]
    fn warm_up_until_bands_exist() {
        let signals = signals(&make_bars(&[10.0; 8]), 5, 2.0);
        assert!(signals[..3].iter().all(|s| s.reason == "warm-up"));
        assert_eq!(signals[3].index, 4);
        assert_ne!(signals[3].reason, "warm-up");
    }

    #[test]
    fn drop_below_band_then_spike_above() {
        let mut closes = vec![100.0, 101.0, 100.0, 101.0, 100.0];
        closes.push(90.0);
        closes.extend([100.0, 101.0, 100.0, 101.0, 115.0]);
        let signals = signals(&make_bars(&closes), 5, 1.0);
        let trades: Vec<_> = signals
            .iter()
            .filter(|s| s.kind != SignalKind::Hold)
            .map(|s| (s.index, s.kind))
            .collect();
        assert_eq!(trades, vec![(5, SignalKind::Buy), (10, SignalKind::Sell)]);
    }

    #[test]
    fn flat_series_never_breaks_out() {
        let signals = signals(&make_bars(&[42.0; 30]), 20, 2.0);
        assert!(signals.iter().all(|s| s.kind == SignalKind::Hold));
    }
}
