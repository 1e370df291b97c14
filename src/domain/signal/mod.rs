//! Per-bar trading signals for the built-in strategy families.
//!
//! Every generator emits exactly one `SignalEvent` per bar from bar 1 to the
//! last bar, so a series of n bars yields n-1 events. Bar 0 is the baseline
//! and never carries a signal.
//!
//! All generators share one long-only position gate: a buy is only emitted
//! while flat and a sell only while long. Entry and exit conditions that
//! fire in the wrong state become holds.

pub mod bollinger_breakout;
pub mod dual_thrust;
pub mod ma_cross;
pub mod macd_cross;
pub mod rsi_threshold;
pub mod turtle;

use std::fmt;

use serde::Serialize;

use crate::domain::error::QuantError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "buy"),
            SignalKind::Sell => write!(f, "sell"),
            SignalKind::Hold => write!(f, "hold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEvent {
    /// Position of the bar in the input series.
    pub index: usize,
    pub kind: SignalKind,
    pub reason: String,
}

/// What a strategy sees at one bar, before the position gate is applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BarCheck {
    /// Indicators needed for this bar are still undefined.
    WarmUp,
    Ready {
        entry: Option<String>,
        exit: Option<String>,
    },
}

impl BarCheck {
    pub(crate) fn ready(entry: Option<String>, exit: Option<String>) -> Self {
        BarCheck::Ready { entry, exit }
    }
}

/// Long-only single-position state machine shared by all strategies.
#[derive(Debug, Default)]
pub(crate) struct PositionGate {
    long: bool,
}

impl PositionGate {
    pub(crate) fn step(&mut self, index: usize, check: BarCheck) -> SignalEvent {
        let (kind, reason) = match check {
            BarCheck::WarmUp => (SignalKind::Hold, "warm-up".to_string()),
            BarCheck::Ready {
                entry: Some(reason),
                ..
            } if !self.long => {
                self.long = true;
                (SignalKind::Buy, reason)
            }
            BarCheck::Ready {
                exit: Some(reason), ..
            } if self.long => {
                self.long = false;
                (SignalKind::Sell, reason)
            }
            BarCheck::Ready { .. } => (SignalKind::Hold, String::new()),
        };
        SignalEvent {
            index,
            kind,
            reason,
        }
    }
}

/// Run `check` for bars 1..n through a fresh position gate.
pub(crate) fn gate_signals(n: usize, mut check: impl FnMut(usize) -> BarCheck) -> Vec<SignalEvent> {
    let mut gate = PositionGate::default();
    (1..n).map(|i| gate.step(i, check(i))).collect()
}

/// Dispatch to the generator for `config`'s strategy family.
///
/// The config is validated first, so hand-built configs with out-of-range
/// parameters are rejected before any bar is evaluated.
pub fn generate_signals(
    config: &StrategyConfig,
    bars: &[PriceBar],
) -> Result<Vec<SignalEvent>, QuantError> {
    config.validate()?;

    let signals = match *config {
        StrategyConfig::MaCross {
            fast_period,
            slow_period,
        } => ma_cross::signals(bars, fast_period, slow_period),
        StrategyConfig::Rsi {
            period,
            oversold,
            overbought,
        } => rsi_threshold::signals(bars, period, oversold, overbought),
        StrategyConfig::Macd {
            fast_period,
            slow_period,
            signal_period,
        } => macd_cross::signals(bars, fast_period, slow_period, signal_period),
        StrategyConfig::Bollinger { period, num_std } => {
            bollinger_breakout::signals(bars, period, num_std)
        }
        StrategyConfig::DualThrust { lookback, k1, k2 } => {
            dual_thrust::signals(bars, lookback, k1, k2)
        }
        StrategyConfig::Turtle {
            entry_period,
            exit_period,
        } => turtle::signals(bars, entry_period, exit_period),
    };

    tracing::debug!(
        strategy = %config.kind(),
        bars = bars.len(),
        buys = signals.iter().filter(|s| s.kind == SignalKind::Buy).count(),
        sells = signals.iter().filter(|s| s.kind == SignalKind::Sell).count(),
        "signals generated"
    );

    Ok(signals)
}
