//! Open position and trade log records.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// The single long position a backtest can hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub quantity: u64,
    /// Fill price of the entry, after slippage.
    pub avg_cost: f64,
    /// quantity × avg_cost, excluding commission.
    pub entry_amount: f64,
    pub entry_commission: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    /// Everything paid to open the position.
    pub fn total_cost(&self) -> f64 {
        self.entry_amount + self.entry_commission
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.market_value(price) - self.total_cost()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// One fill in the append-only trade log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub direction: TradeSide,
    /// Fill price after slippage.
    pub price: f64,
    pub quantity: u64,
    /// Gross amount, price × quantity.
    pub amount: f64,
    pub commission: f64,
    /// Realized P&L, present on sells only.
    pub pnl: Option<f64>,
    pub reason: String,
    /// Set on the synthetic sell that closes a position left open at the end.
    pub forced: bool,
}

impl Trade {
    pub fn is_sell(&self) -> bool {
        self.direction == TradeSide::Sell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position {
            quantity: 100,
            avg_cost: 50.0,
            entry_amount: 5000.0,
            entry_commission: 5.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn market_value() {
        let pos = sample_position();
        assert!((pos.market_value(55.0) - 5500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_cost_includes_commission() {
        assert!((sample_position().total_cost() - 5005.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_after_commission() {
        let pos = sample_position();
        assert!((pos.unrealized_pnl(55.0) - 495.0).abs() < 1e-9);
        assert!((pos.unrealized_pnl(50.0) + 5.0).abs() < 1e-9);
    }

    #[test]
    fn trade_serializes_side_lowercase() {
        let trade = Trade {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            direction: TradeSide::Sell,
            price: 55.0,
            quantity: 100,
            amount: 5500.0,
            commission: 5.5,
            pnl: Some(489.5),
            reason: "RSI overbought".into(),
            forced: false,
        };
        assert!(trade.is_sell());
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["direction"], "sell");
        assert_eq!(json["date"], "2024-02-01");
        assert_eq!(json["pnl"], 489.5);
    }

    #[test]
    fn buy_trade_has_null_pnl() {
        let trade = Trade {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            direction: TradeSide::Buy,
            price: 50.0,
            quantity: 10,
            amount: 500.0,
            commission: 0.5,
            pnl: None,
            reason: String::new(),
            forced: false,
        };
        assert!(!trade.is_sell());
        assert!(serde_json::to_value(&trade).unwrap()["pnl"].is_null());
    }
}
