//! Risk metrics over an equity or price series, the composite risk score,
//! and position-level risk helpers.
//!
//! All ratios are fractions (0.05 = 5%).

use std::fmt;

use serde::Serialize;

use super::error::QuantError;
use super::indicator::{mean, sample_std};
use super::metrics::{
    TRADING_DAYS_PER_YEAR, drawdown_series, period_returns, sharpe_ratio, sortino_ratio,
};

pub const DEFAULT_MAX_POSITION_PCT: f64 = 0.10;
pub const DEFAULT_STOP_LOSS_PCT: f64 = 0.05;
pub const DEFAULT_TAKE_PROFIT_PCT: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    /// Annualized stddev of per-bar returns.
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub current_drawdown: f64,
    /// 5th percentile of per-bar returns.
    pub var_95: f64,
    /// Mean of the returns at or below `var_95`.
    pub cvar_95: f64,
    pub total_return: f64,
    pub win_days: usize,
    pub lose_days: usize,
    pub daily_win_rate: f64,
}

pub fn risk_metrics(values: &[f64]) -> Result<RiskMetrics, QuantError> {
    if values.len() < 2 {
        return Err(QuantError::InsufficientData {
            bars: values.len(),
            minimum: 2,
        });
    }

    let returns = period_returns(values);
    let drawdowns = drawdown_series(values);

    let std = sample_std(&returns);
    let volatility = if std.is_nan() {
        0.0
    } else {
        std * TRADING_DAYS_PER_YEAR.sqrt()
    };

    let var_95 = percentile(&returns, 5.0);
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var_95).collect();
    let cvar_95 = if tail.is_empty() { var_95 } else { mean(&tail) };

    let win_days = returns.iter().filter(|r| **r > 0.0).count();
    let lose_days = returns.iter().filter(|r| **r < 0.0).count();

    let first = values[0];
    let last = values[values.len() - 1];

    Ok(RiskMetrics {
        volatility,
        sharpe_ratio: sharpe_ratio(&returns),
        sortino_ratio: sortino_ratio(&returns),
        max_drawdown: drawdowns.iter().copied().fold(0.0, f64::max),
        current_drawdown: drawdowns.last().copied().unwrap_or(0.0),
        var_95,
        cvar_95,
        total_return: if first != 0.0 { last / first - 1.0 } else { 0.0 },
        win_days,
        lose_days,
        daily_win_rate: win_days as f64 / returns.len() as f64,
    })
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    MediumLow,
    Medium,
    MediumHigh,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => RiskLevel::Low,
            60..=79 => RiskLevel::MediumLow,
            40..=59 => RiskLevel::Medium,
            20..=39 => RiskLevel::MediumHigh,
            _ => RiskLevel::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low risk",
            RiskLevel::MediumLow => "medium-low risk",
            RiskLevel::Medium => "medium risk",
            RiskLevel::MediumHigh => "medium-high risk",
            RiskLevel::High => "high risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    /// 0–100, higher is safer.
    pub score: u32,
    pub level: RiskLevel,
    pub label: String,
    pub reasons: Vec<String>,
}

/// Composite safety score. Starts at 50 and moves by fixed deltas keyed to
/// Sharpe, max drawdown, daily win rate and volatility.
pub fn risk_score(metrics: &RiskMetrics) -> RiskScore {
    let mut score = 50.0;
    let mut reasons = Vec::new();

    let sr = metrics.sharpe_ratio;
    if sr > 2.0 {
        score += 15.0;
        reasons.push(format!("excellent Sharpe ratio ({:.2})", sr));
    } else if sr > 1.0 {
        score += 8.0;
        reasons.push(format!("good Sharpe ratio ({:.2})", sr));
    } else if sr < 0.0 {
        score -= 15.0;
        reasons.push(format!("negative Sharpe ratio ({:.2})", sr));
    }

    let mdd = metrics.max_drawdown;
    if mdd < 0.05 {
        score += 15.0;
        reasons.push(format!("very low max drawdown ({:.2}%)", mdd * 100.0));
    } else if mdd < 0.10 {
        score += 8.0;
        reasons.push(format!("low max drawdown ({:.2}%)", mdd * 100.0));
    } else if mdd > 0.30 {
        score -= 20.0;
        reasons.push(format!("excessive max drawdown ({:.2}%)", mdd * 100.0));
    } else if mdd > 0.20 {
        score -= 10.0;
        reasons.push(format!("high max drawdown ({:.2}%)", mdd * 100.0));
    }

    let wr = metrics.daily_win_rate;
    if wr > 0.55 {
        score += 10.0;
        reasons.push(format!("high daily win rate ({:.2}%)", wr * 100.0));
    } else if wr < 0.45 {
        score -= 10.0;
        reasons.push(format!("low daily win rate ({:.2}%)", wr * 100.0));
    }

    let vol = metrics.volatility;
    if vol < 0.15 {
        score += 5.0;
        reasons.push(format!("low volatility ({:.2}%)", vol * 100.0));
    } else if vol > 0.40 {
        score -= 10.0;
        reasons.push(format!("excessive volatility ({:.2}%)", vol * 100.0));
    }

    let score = f64::clamp(score, 0.0, 100.0).round() as u32;
    let level = RiskLevel::from_score(score);
    RiskScore {
        score,
        level,
        label: level.label().to_string(),
        reasons,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionCheck {
    pub allowed: bool,
    pub order_amount: f64,
    pub max_allowed: f64,
    pub portfolio_value: f64,
    /// Order amount as a fraction of the portfolio.
    pub position_pct: f64,
    pub message: String,
}

/// Check an order against a per-position cap (`max_pct` of portfolio value).
pub fn check_position_size(portfolio_value: f64, order_amount: f64, max_pct: f64) -> PositionCheck {
    let max_allowed = portfolio_value * max_pct;
    let allowed = order_amount <= max_allowed;
    let message = if allowed {
        String::new()
    } else {
        format!(
            "order amount {:.0} exceeds position limit {:.0} ({:.0}%)",
            order_amount,
            max_allowed,
            max_pct * 100.0
        )
    };
    PositionCheck {
        allowed,
        order_amount,
        max_allowed,
        portfolio_value,
        position_pct: if portfolio_value != 0.0 {
            order_amount / portfolio_value
        } else {
            0.0
        },
        message,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopMethod {
    /// Distance as a fraction of the entry price.
    Fixed(f64),
    /// Distance as a multiple of the average true range.
    Atr { atr: f64, multiplier: f64 },
}

impl Default for StopMethod {
    fn default() -> Self {
        StopMethod::Fixed(DEFAULT_STOP_LOSS_PCT)
    }
}

pub fn stop_loss_price(entry: f64, side: Side, method: StopMethod) -> f64 {
    let distance = match method {
        StopMethod::Fixed(pct) => entry * pct,
        StopMethod::Atr { atr, multiplier } => atr * multiplier,
    };
    match side {
        Side::Long => entry - distance,
        Side::Short => entry + distance,
    }
}

pub fn take_profit_price(entry: f64, side: Side, pct: f64) -> f64 {
    match side {
        Side::Long => entry * (1.0 + pct),
        Side::Short => entry * (1.0 - pct),
    }
}
