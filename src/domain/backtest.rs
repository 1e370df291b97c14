//! Backtest engine and event loop.
//!
//! `simulate` replays a signal sequence bar by bar against a fresh ledger.
//! `run_backtest` wraps it with validation, signal generation and the
//! performance/risk analytics of the finished run.

use serde::Serialize;

use super::error::QuantError;
use super::execution::{self, EntryResult, ExecutionConfig, ExitResult};
use super::metrics::{
    DrawdownPoint, MonthlyReturn, PerformanceMetrics, drawdown_curve, monthly_returns,
};
use super::ohlcv::{PriceBar, validate_series};
use super::portfolio::{EquityPoint, Ledger};
use super::position::Trade;
use super::risk::{RiskMetrics, risk_metrics};
use super::signal::{SignalEvent, SignalKind, generate_signals};
use super::strategy::StrategyConfig;

/// Shortest series a backtest accepts.
pub const MIN_BACKTEST_BARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_rate: f64,
    pub slippage_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 1_000_000.0,
            commission_rate: 0.001,
            slippage_rate: 0.001,
        }
    }
}

impl BacktestConfig {
    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_rate: self.commission_rate,
            slippage_rate: self.slippage_rate,
        }
    }

    pub fn validate(&self) -> Result<(), QuantError> {
        let invalid = |key: &str, reason: &str| QuantError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: reason.into(),
        };
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(invalid("initial_capital", "must be a positive number"));
        }
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(invalid("commission_rate", "must be in [0, 1)"));
        }
        if !(0.0..1.0).contains(&self.slippage_rate) {
            return Err(invalid("slippage_rate", "must be in [0, 1)"));
        }
        Ok(())
    }
}

/// Running peak and the deepest drawdown seen so far.
#[derive(Debug, Clone, PartialEq)]
struct DrawdownTracker {
    peak: f64,
    peak_index: usize,
    max_drawdown: f64,
    max_duration: usize,
}

impl DrawdownTracker {
    fn new(initial: f64) -> Self {
        DrawdownTracker {
            peak: initial,
            peak_index: 0,
            max_drawdown: 0.0,
            max_duration: 0,
        }
    }

    fn update(&mut self, index: usize, value: f64) {
        if value > self.peak {
            self.peak = value;
            self.peak_index = index;
        }
        let dd = if self.peak > 0.0 {
            (self.peak - value) / self.peak
        } else {
            0.0
        };
        if dd > self.max_drawdown {
            self.max_drawdown = dd;
            self.max_duration = index - self.peak_index;
        }
    }
}

/// Ledger state and drawdown tracking at the end of a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub ledger: Ledger,
    pub max_drawdown: f64,
    /// Bars between the peak and the bar that set the maximum drawdown.
    pub max_drawdown_duration: usize,
}

/// Replay `signals` (one per bar from bar 1) over `bars`.
///
/// Equity is recorded for every bar, starting with the initial capital at
/// bar 0. A position still open after the last bar is force-closed at the
/// final close, and the last equity point is replaced by the resulting cash.
pub fn simulate(bars: &[PriceBar], signals: &[SignalEvent], config: &BacktestConfig) -> Simulation {
    let mut ledger = Ledger::new(config.initial_capital);
    let mut tracker = DrawdownTracker::new(config.initial_capital);
    let exec = config.execution();

    let Some(first) = bars.first() else {
        return Simulation {
            ledger,
            max_drawdown: 0.0,
            max_drawdown_duration: 0,
        };
    };
    ledger.record_equity(first.date, config.initial_capital);

    for (idx, bar) in bars.iter().enumerate().skip(1) {
        let signal = signals.get(idx - 1);
        let (kind, reason) = signal.map_or((SignalKind::Hold, ""), |s| (s.kind, s.reason.as_str()));

        match kind {
            SignalKind::Buy => {
                match execution::enter_long(&mut ledger, bar.date, bar.close, reason, &exec) {
                    EntryResult::Entered {
                        quantity,
                        execution_price,
                        ..
                    } => {
                        tracing::debug!(date = %bar.date, quantity, price = execution_price, reason, "buy");
                    }
                    EntryResult::ZeroQuantity => {
                        tracing::warn!(date = %bar.date, cash = ledger.cash, "buy signal sized to zero shares, skipped");
                    }
                    EntryResult::AlreadyLong => {}
                }
            }
            SignalKind::Sell => {
                if let ExitResult::Exited {
                    quantity,
                    execution_price,
                    pnl,
                    ..
                } = execution::exit_long(&mut ledger, bar.date, bar.close, reason, &exec)
                {
                    tracing::debug!(date = %bar.date, quantity, price = execution_price, pnl, reason, "sell");
                }
            }
            SignalKind::Hold => {}
        }

        let value = ledger.total_equity(bar.close);
        ledger.record_equity(bar.date, value);
        tracker.update(idx, value);
    }

    let Some(last) = bars.last() else {
        return Simulation {
            ledger,
            max_drawdown: tracker.max_drawdown,
            max_drawdown_duration: tracker.max_duration,
        };
    };
    if let ExitResult::Exited { pnl, .. } =
        execution::force_close(&mut ledger, last.date, last.close, &exec)
    {
        tracing::debug!(date = %last.date, pnl, "closed open position at end of run");
        let cash = ledger.cash;
        if let Some(point) = ledger.equity_curve.last_mut() {
            point.value = cash;
        }
    }

    Simulation {
        ledger,
        max_drawdown: tracker.max_drawdown,
        max_drawdown_duration: tracker.max_duration,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub strategy: StrategyConfig,
    pub initial_capital: f64,
    pub final_value: f64,
    #[serde(flatten)]
    pub metrics: PerformanceMetrics,
    pub max_drawdown_duration: usize,
    pub risk: RiskMetrics,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_curve: Vec<DrawdownPoint>,
    pub monthly_returns: Vec<MonthlyReturn>,
    pub trades: Vec<Trade>,
}

/// Validate inputs, generate signals for `strategy`, simulate, and derive
/// the performance and risk statistics of the run.
pub fn run_backtest(
    bars: &[PriceBar],
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> Result<BacktestResult, QuantError> {
    strategy.validate()?;
    config.validate()?;
    if bars.len() < MIN_BACKTEST_BARS {
        return Err(QuantError::InsufficientData {
            bars: bars.len(),
            minimum: MIN_BACKTEST_BARS,
        });
    }
    validate_series(bars)?;

    let signals = generate_signals(strategy, bars)?;
    let sim = simulate(bars, &signals, config);
    let ledger = sim.ledger;

    let values: Vec<f64> = ledger.equity_curve.iter().map(|p| p.value).collect();
    let metrics =
        PerformanceMetrics::compute(&ledger.equity_curve, &ledger.trades, config.initial_capital);
    let risk = risk_metrics(&values)?;

    tracing::info!(
        strategy = %strategy.kind(),
        bars = bars.len(),
        trades = metrics.trades.total_trades,
        total_return = metrics.total_return,
        max_drawdown = metrics.max_drawdown,
        "backtest complete"
    );

    Ok(BacktestResult {
        strategy: strategy.clone(),
        initial_capital: config.initial_capital,
        final_value: ledger.final_value(),
        max_drawdown_duration: sim.max_drawdown_duration,
        drawdown_curve: drawdown_curve(&ledger.equity_curve),
        monthly_returns: monthly_returns(&ledger.equity_curve),
        metrics,
        risk,
        equity_curve: ledger.equity_curve,
        trades: ledger.trades,
    })
}
