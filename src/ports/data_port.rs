//! Data access port trait.

use crate::domain::error::QuantError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

/// Source of daily OHLCV history.
///
/// Implementations return bars sorted by ascending date. `None` bounds are
/// open-ended.
pub trait DataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, QuantError>;

    fn list_symbols(&self) -> Result<Vec<String>, QuantError>;

    /// First date, last date and bar count, or `None` when the symbol has no data.
    fn get_data_range(&self, symbol: &str)
    -> Result<Option<(NaiveDate, NaiveDate, usize)>, QuantError>;
}
