//! quantcore: indicator library, strategy signals, trend scoring and
//! long-only backtesting for daily OHLCV data.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], command-line surface in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
