//! Moving-average crossover.
//!
//! Buy when the fast SMA crosses above the slow SMA:
//! fast[i] > slow[i] and fast[i-1] <= slow[i-1]. Sell on the mirror cross.
//! Bars where either average is undefined at i or i-1 are warm-up.

use super::{BarCheck, SignalEvent, gate_signals};
use crate::domain::indicator::sma;
use crate::domain::ohlcv::{self, PriceBar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cross {
    Above,
    Below,
    None,
}

/// Classify bar `i` (i ≥ 1) as a crossing of `a` over `b`. Returns `None`
/// when any of the four values involved is undefined.
pub(crate) fn cross_at(a: &[f64], b: &[f64], i: usize) -> Option<Cross> {
    let (a0, a1, b0, b1) = (a[i - 1], a[i], b[i - 1], b[i]);
    if a0.is_nan() || a1.is_nan() || b0.is_nan() || b1.is_nan() {
        return None;
    }
    Some(if a1 > b1 && a0 <= b0 {
        Cross::Above
    } else if a1 < b1 && a0 >= b0 {
        Cross::Below
    } else {
        Cross::None
    })
}

pub fn signals(bars: &[PriceBar], fast: usize, slow: usize) -> Vec<SignalEvent> {
    let closes = ohlcv::closes(bars);
    let ma_fast = sma(&closes, fast);
    let ma_slow = sma(&closes, slow);

    gate_signals(bars.len(), |i| match cross_at(&ma_fast, &ma_slow, i) {
        None => BarCheck::WarmUp,
        Some(Cross::Above) => {
            BarCheck::ready(Some(format!("MA{} crossed above MA{}", fast, slow)), None)
        }
        Some(Cross::Below) => {
            BarCheck::ready(None, Some(format!("MA{} crossed below MA{}", fast, slow)))
        }
        Some(Cross::None) => BarCheck::ready(None, None),
    })
}
