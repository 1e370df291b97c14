//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantError;

/// Port for persisting a finished backtest.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), QuantError>;
}
