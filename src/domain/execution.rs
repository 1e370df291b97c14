//! Trade execution and fill simulation.
//!
//! Fills happen at the bar's close adjusted against the trader by the
//! slippage rate. Commission is a flat rate on the gross amount. Entries
//! commit 95% of available cash so commission always fits.

use chrono::NaiveDate;

use super::portfolio::Ledger;
use super::position::{Position, Trade, TradeSide};

/// Share of available cash an entry may commit.
pub const CASH_UTILIZATION: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    pub commission_rate: f64,
    pub slippage_rate: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_rate: 0.001,
            slippage_rate: 0.001,
        }
    }
}

/// Buy fill: market_price × (1 + slippage_rate)
pub fn buy_fill_price(market_price: f64, slippage_rate: f64) -> f64 {
    market_price * (1.0 + slippage_rate)
}

/// Sell fill: market_price × (1 - slippage_rate)
pub fn sell_fill_price(market_price: f64, slippage_rate: f64) -> f64 {
    market_price * (1.0 - slippage_rate)
}

pub fn calculate_commission(amount: f64, commission_rate: f64) -> f64 {
    amount * commission_rate
}

/// Whole shares affordable with 95% of `cash` once commission is included:
/// floor(cash × 0.95 / (fill_price × (1 + commission_rate))).
pub fn order_quantity(cash: f64, fill_price: f64, commission_rate: f64) -> u64 {
    let per_share = fill_price * (1.0 + commission_rate);
    if cash <= 0.0 || per_share.is_nan() || per_share <= 0.0 {
        return 0;
    }
    let quantity = (cash * CASH_UTILIZATION / per_share).floor();
    if quantity.is_finite() && quantity > 0.0 {
        quantity as u64
    } else {
        0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        quantity: u64,
        execution_price: f64,
        cost: f64,
        commission: f64,
    },
    /// Sizing produced zero shares; nothing was traded.
    ZeroQuantity,
    AlreadyLong,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExitResult {
    Exited {
        quantity: u64,
        execution_price: f64,
        revenue: f64,
        commission: f64,
        pnl: f64,
    },
    NoPosition,
}

/// Open a long position with all usable cash.
///
/// 1. Apply buy slippage to the market price
/// 2. Size the order with `order_quantity`
/// 3. Deduct cost + commission from cash
/// 4. Record the position and a buy trade
pub fn enter_long(
    ledger: &mut Ledger,
    date: NaiveDate,
    market_price: f64,
    reason: &str,
    config: &ExecutionConfig,
) -> EntryResult {
    if !ledger.is_flat() {
        return EntryResult::AlreadyLong;
    }

    let execution_price = buy_fill_price(market_price, config.slippage_rate);
    let quantity = order_quantity(ledger.cash, execution_price, config.commission_rate);
    if quantity == 0 {
        return EntryResult::ZeroQuantity;
    }

    let cost = quantity as f64 * execution_price;
    let commission = calculate_commission(cost, config.commission_rate);
    ledger.cash -= cost + commission;

    ledger.position = Some(Position {
        quantity,
        avg_cost: execution_price,
        entry_amount: cost,
        entry_commission: commission,
        entry_date: date,
    });
    ledger.record_trade(Trade {
        date,
        direction: TradeSide::Buy,
        price: execution_price,
        quantity,
        amount: cost,
        commission,
        pnl: None,
        reason: reason.to_string(),
        forced: false,
    });

    EntryResult::Entered {
        quantity,
        execution_price,
        cost,
        commission,
    }
}

/// Sell the whole position at the slipped market price.
pub fn exit_long(
    ledger: &mut Ledger,
    date: NaiveDate,
    market_price: f64,
    reason: &str,
    config: &ExecutionConfig,
) -> ExitResult {
    let execution_price = sell_fill_price(market_price, config.slippage_rate);
    close_position(
        ledger,
        date,
        execution_price,
        config.commission_rate,
        reason,
        false,
    )
}

/// Liquidate a position still open after the last bar. Fills at the close
/// without slippage; commission still applies.
pub fn force_close(
    ledger: &mut Ledger,
    date: NaiveDate,
    close: f64,
    config: &ExecutionConfig,
) -> ExitResult {
    close_position(
        ledger,
        date,
        close,
        config.commission_rate,
        "closed at end of backtest",
        true,
    )
}

fn close_position(
    ledger: &mut Ledger,
    date: NaiveDate,
    execution_price: f64,
    commission_rate: f64,
    reason: &str,
    forced: bool,
) -> ExitResult {
    let Some(position) = ledger.position.take() else {
        return ExitResult::NoPosition;
    };

    let quantity = position.quantity;
    let revenue = quantity as f64 * execution_price;
    let commission = calculate_commission(revenue, commission_rate);
    let pnl = revenue - commission - position.total_cost();
    ledger.cash += revenue - commission;

    ledger.record_trade(Trade {
        date,
        direction: TradeSide::Sell,
        price: execution_price,
        quantity,
        amount: revenue,
        commission,
        pnl: Some(pnl),
        reason: reason.to_string(),
        forced,
    });

    ExitResult::Exited {
        quantity,
        execution_price,
        revenue,
        commission,
        pnl,
    }
}
