//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod strategy;
pub mod signal;
pub mod trend;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod risk;
pub mod recommendation;
pub mod config_validation;
pub mod error;
