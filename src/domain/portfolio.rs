//! Simulated account ledger and equity tracking.

use chrono::NaiveDate;
use serde::Serialize;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Cash, the open position (if any), and the append-only logs of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Ledger {
            cash: initial_capital,
            initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn position_quantity(&self) -> u64 {
        self.position.as_ref().map_or(0, |p| p.quantity)
    }

    pub fn total_equity(&self, price: f64) -> f64 {
        self.cash + self.position.as_ref().map_or(0.0, |p| p.market_value(price))
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn record_equity(&mut self, date: NaiveDate, value: f64) {
        self.equity_curve.push(EquityPoint { date, value });
    }

    pub fn final_value(&self) -> f64 {
        self.equity_curve
            .last()
            .map_or(self.initial_capital, |p| p.value)
    }
}
