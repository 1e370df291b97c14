//! Performance metrics and statistics.
//!
//! Every ratio here has an explicit fallback for degenerate input (empty
//! curves, zero variance, no losing trades) so callers never see a division
//! error or NaN from a well-formed run.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::indicator::{mean, sample_std};
use super::portfolio::EquityPoint;
use super::position::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    #[serde(flatten)]
    pub trades: TradeStats,
}

impl PerformanceMetrics {
    pub fn compute(equity_curve: &[EquityPoint], trades: &[Trade], initial_capital: f64) -> Self {
        let values: Vec<f64> = equity_curve.iter().map(|p| p.value).collect();
        let final_value = values.last().copied().unwrap_or(initial_capital);
        let returns = period_returns(&values);

        let total_return = total_return(initial_capital, final_value);
        let annualized_return = match (equity_curve.first(), equity_curve.last()) {
            (Some(first), Some(last)) => annualized_return(total_return, first.date, last.date),
            _ => 0.0,
        };

        PerformanceMetrics {
            total_return,
            annualized_return,
            sharpe_ratio: sharpe_ratio(&returns),
            sortino_ratio: sortino_ratio(&returns),
            max_drawdown: max_drawdown(&values),
            trades: TradeStats::from_trades(trades),
        }
    }
}

/// Statistics over realized (sell-side) trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    /// Sells with pnl <= 0, so breakeven trades count as losses.
    pub losing_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    /// Average losing P&L as a positive magnitude.
    pub avg_loss: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
}

impl TradeStats {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let pnls: Vec<f64> = trades
            .iter()
            .filter(|t| t.is_sell())
            .filter_map(|t| t.pnl)
            .collect();
        if pnls.is_empty() {
            return TradeStats::default();
        }

        let (wins, losses): (Vec<f64>, Vec<f64>) = pnls.iter().partition(|&&p| p > 0.0);
        let total_wins: f64 = wins.iter().sum();
        let total_losses: f64 = losses.iter().sum::<f64>().abs();

        TradeStats {
            total_trades: pnls.len(),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate: wins.len() as f64 / pnls.len() as f64,
            profit_factor: total_wins / total_losses.max(1.0),
            avg_win: if wins.is_empty() {
                0.0
            } else {
                total_wins / wins.len() as f64
            },
            avg_loss: if losses.is_empty() {
                0.0
            } else {
                total_losses / losses.len() as f64
            },
            best_trade: pnls.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_trade: pnls.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReturn {
    /// `YYYY-MM`
    pub month: String,
    #[serde(rename = "return")]
    pub ret: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub drawdown: f64,
}

pub fn total_return(initial: f64, final_value: f64) -> f64 {
    if initial > 0.0 {
        final_value / initial - 1.0
    } else {
        0.0
    }
}

/// (1 + total_return)^(365 / days) - 1, with days floored at 1.
pub fn annualized_return(total_return: f64, first: NaiveDate, last: NaiveDate) -> f64 {
    let days = (last - first).num_days().max(1) as f64;
    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(365.0 / days) - 1.0
}

/// Percentage change between consecutive values. A zero base yields 0.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// mean / sample stddev × √252, or 0 when the stddev is zero or undefined.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    annualized_ratio(mean(returns), sample_std(returns))
}

/// Like Sharpe, but the denominator is the stddev of negative returns only.
pub fn sortino_ratio(returns: &[f64]) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    annualized_ratio(mean(returns), sample_std(&downside))
}

fn annualized_ratio(mean: f64, std: f64) -> f64 {
    if std.is_nan() || std <= 0.0 || mean.is_nan() {
        0.0
    } else {
        mean / std * TRADING_DAYS_PER_YEAR.sqrt()
    }
}

/// (running_peak - value) / running_peak for each value, as a fraction.
pub fn drawdown_series(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            peak = peak.max(v);
            if peak > 0.0 { (peak - v) / peak } else { 0.0 }
        })
        .collect()
}

pub fn max_drawdown(values: &[f64]) -> f64 {
    drawdown_series(values).into_iter().fold(0.0, f64::max)
}

pub fn drawdown_curve(equity_curve: &[EquityPoint]) -> Vec<DrawdownPoint> {
    let values: Vec<f64> = equity_curve.iter().map(|p| p.value).collect();
    equity_curve
        .iter()
        .zip(drawdown_series(&values))
        .map(|(p, drawdown)| DrawdownPoint {
            date: p.date,
            drawdown,
        })
        .collect()
}

/// Month-end to month-end returns over the months present in the curve.
/// The first observed month has no prior month-end and is dropped.
pub fn monthly_returns(equity_curve: &[EquityPoint]) -> Vec<MonthlyReturn> {
    let mut month_ends: Vec<(i32, u32, f64)> = Vec::new();
    for point in equity_curve {
        let key = (point.date.year(), point.date.month());
        match month_ends.last_mut() {
            Some(last) if (last.0, last.1) == key => last.2 = point.value,
            _ => month_ends.push((key.0, key.1, point.value)),
        }
    }

    month_ends
        .windows(2)
        .map(|w| MonthlyReturn {
            month: format!("{:04}-{:02}", w[1].0, w[1].1),
            ret: if w[0].2 != 0.0 { w[1].2 / w[0].2 - 1.0 } else { 0.0 },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::TradeSide;

    fn make_curve(values: &[f64]) -> Vec<EquityPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: start + chrono::Duration::days(i as i64),
                value: v,
            })
            .collect()
    }

    fn sell(pnl: f64) -> Trade {
        Trade {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            direction: TradeSide::Sell,
            price: 10.0,
            quantity: 1,
            amount: 10.0,
            commission: 0.0,
            pnl: Some(pnl),
            reason: String::new(),
            forced: false,
        }
    }

    fn buy() -> Trade {
        Trade {
            direction: TradeSide::Buy,
            pnl: None,
            ..sell(0.0)
        }
    }

    #[test]
    fn total_return_basic() {
        assert!((total_return(100_000.0, 110_000.0) - 0.10).abs() < 1e-12);
        assert!(total_return(0.0, 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn annualized_return_one_year() {
        let first = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!((annualized_return(0.10, first, last) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn annualized_return_same_day_is_floored() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let expected = 1.001f64.powf(365.0) - 1.0;
        assert!((annualized_return(0.001, d, d) - expected).abs() < 1e-9);
    }

    #[test]
    fn sharpe_zero_variance_is_zero() {
        assert!(sharpe_ratio(&[0.01, 0.01, 0.01]).abs() < f64::EPSILON);
        assert!(sharpe_ratio(&[]).abs() < f64::EPSILON);
        assert!(sharpe_ratio(&[0.01]).abs() < f64::EPSILON);
    }

    #[test]
    fn sharpe_known_value() {
        let returns = [0.01, -0.01, 0.02];
        let m: f64 = 0.02 / 3.0;
        let var = ((0.01 - m).powi(2) + (-0.01 - m).powi(2) + (0.02 - m).powi(2)) / 2.0;
        let expected = m / var.sqrt() * 252.0f64.sqrt();
        assert!((sharpe_ratio(&returns) - expected).abs() < 1e-12);
    }

    #[test]
    fn sortino_needs_two_negative_returns() {
        assert!(sortino_ratio(&[0.01, 0.02, 0.03]).abs() < f64::EPSILON);
        assert!(sortino_ratio(&[0.01, -0.02, 0.03]).abs() < f64::EPSILON);
        let returns = [0.03, -0.01, -0.02, 0.04];
        let m = 0.04 / 4.0;
        let down_std = (2.0 * 0.005f64.powi(2)).sqrt();
        let expected = m / down_std * 252.0f64.sqrt();
        assert!((sortino_ratio(&returns) - expected).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_rising_curve_is_zero() {
        assert!(max_drawdown(&[100.0, 101.0, 102.0, 105.0]).abs() < f64::EPSILON);
        assert!(max_drawdown(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert!((dd - 0.25).abs() < 1e-12);
    }

    #[test]
    fn drawdown_curve_is_fraction_per_point() {
        let curve = drawdown_curve(&make_curve(&[100.0, 80.0, 100.0]));
        assert_eq!(curve.len(), 3);
        assert!(curve[0].drawdown.abs() < f64::EPSILON);
        assert!((curve[1].drawdown - 0.2).abs() < 1e-12);
        assert!(curve[2].drawdown.abs() < f64::EPSILON);
    }

    #[test]
    fn period_returns_zero_base() {
        let r = period_returns(&[0.0, 10.0, 11.0]);
        assert!(r[0].abs() < f64::EPSILON);
        assert!((r[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn trade_stats_mixed() {
        let trades = vec![buy(), sell(300.0), buy(), sell(-100.0), buy(), sell(0.0)];
        let stats = TradeStats::from_trades(&trades);
        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.winning_trades, 1);
        assert_eq!(stats.losing_trades, 2);
        assert!((stats.win_rate - 1.0 / 3.0).abs() < 1e-12);
        assert!((stats.profit_factor - 3.0).abs() < 1e-12);
        assert!((stats.avg_win - 300.0).abs() < 1e-12);
        assert!((stats.avg_loss - 50.0).abs() < 1e-12);
        assert!((stats.best_trade - 300.0).abs() < 1e-12);
        assert!((stats.worst_trade + 100.0).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_denominator_floored_at_one() {
        let stats = TradeStats::from_trades(&[sell(50.0), sell(-0.5)]);
        assert!((stats.profit_factor - 50.0).abs() < 1e-12);
        let stats = TradeStats::from_trades(&[sell(50.0)]);
        assert!((stats.profit_factor - 50.0).abs() < 1e-12);
        assert!(stats.avg_loss.abs() < f64::EPSILON);
    }

    #[test]
    fn trade_stats_all_losing() {
        let stats = TradeStats::from_trades(&[sell(-10.0), sell(-30.0)]);
        assert!(stats.win_rate.abs() < f64::EPSILON);
        assert!(stats.profit_factor.abs() < f64::EPSILON);
        assert!(stats.avg_win.abs() < f64::EPSILON);
        assert!((stats.avg_loss - 20.0).abs() < 1e-12);
    }

    #[test]
    fn trade_stats_without_sells() {
        assert_eq!(TradeStats::from_trades(&[buy()]), TradeStats::default());
    }

    #[test]
    fn monthly_returns_use_month_end_values() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let curve: Vec<EquityPoint> = [100.0, 110.0, 120.0, 99.0, 132.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: start + chrono::Duration::days(i as i64 * 15),
                value: v,
            })
            .collect();
        // Jan 30 = 100, Feb 14 / Feb 29 = 110 / 120, Mar 15 / Mar 30 = 99 / 132
        let months = monthly_returns(&curve);
        assert_eq!(
            months.iter().map(|m| m.month.as_str()).collect::<Vec<_>>(),
            vec!["2024-02", "2024-03"]
        );
        assert!((months[0].ret - 0.2).abs() < 1e-12);
        assert!((months[1].ret - 0.1).abs() < 1e-12);
    }

    #[test]
    fn performance_metrics_flat_curve() {
        let curve = make_curve(&[1000.0; 40]);
        let m = PerformanceMetrics::compute(&curve, &[], 1000.0);
        assert!(m.total_return.abs() < f64::EPSILON);
        assert!(m.sharpe_ratio.abs() < f64::EPSILON);
        assert!(m.sortino_ratio.abs() < f64::EPSILON);
        assert!(m.max_drawdown.abs() < f64::EPSILON);
        assert_eq!(m.trades.total_trades, 0);
    }
}
