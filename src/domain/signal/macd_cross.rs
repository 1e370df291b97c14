//! MACD line / signal line crossover.

use super::ma_cross::{Cross, cross_at};
use super::{BarCheck, SignalEvent, gate_signals};
use crate::domain::indicator::macd;
use crate::domain::ohlcv::{self, PriceBar};

pub fn signals(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Vec<SignalEvent> {
    let series = macd(&ohlcv::closes(bars), fast, slow, signal_period);

    gate_signals(bars.len(), |i| match cross_at(&series.line, &series.signal, i) {
        None => BarCheck::WarmUp,
        Some(Cross::Above) => BarCheck::ready(Some("MACD golden cross".to_string()), None),
        Some(Cross::Below) => BarCheck::ready(None, Some("MACD death cross".to_string())),
        Some(Cross::None) => BarCheck::ready(None, None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::SignalKind;
    use crate::domain::signal::test_support::make_bars;

    #[test]
    fn macd_has_no_warm_up() {
        let signals = signals(&make_bars(&[10.0; 5]), 12, 26, 9);
        assert_eq!(signals.len(), 4);
        assert!(signals.iter().all(|s| s.reason != "warm-up"));
    }

    #[test]
    fn v_shaped_series_buys_after_bottom() {
        let mut closes: Vec<f64> = (0..20).map(|i| 120.0 - i as f64).collect();
        closes.extend((0..20).map(|i| 101.0 + i as f64 * 2.0));
        let signals = signals(&make_bars(&closes), 12, 26, 9);
        let first = signals
            .iter()
            .find(|s| s.kind != SignalKind::Hold)
            .unwrap();
        assert_eq!(first.kind, SignalKind::Buy);
        assert_eq!(first.reason, "MACD golden cross");
        assert!(first.index >= 20);
    }
}
