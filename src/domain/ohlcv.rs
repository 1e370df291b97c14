//! OHLCV price bar and series helpers.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::QuantError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn highs(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.high).collect()
}

pub fn lows(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.low).collect()
}

pub fn volumes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Reject series whose dates are not strictly increasing.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), QuantError> {
    match bars.windows(2).position(|w| w[1].date <= w[0].date) {
        Some(i) => Err(QuantError::UnorderedSeries { index: i + 1 }),
        None => Ok(()),
    }
}

/// Keep bars whose date falls inside the inclusive range.
pub fn filter_by_date(
    bars: &[PriceBar],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<PriceBar> {
    bars.iter()
        .filter(|b| start.is_none_or(|s| b.date >= s) && end.is_none_or(|e| b.date <= e))
        .cloned()
        .collect()
}
