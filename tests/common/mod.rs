#![allow(dead_code)]

use chrono::NaiveDate;
use quantcore::domain::backtest::BacktestResult;
use quantcore::domain::error::QuantError;
pub use quantcore::domain::ohlcv::PriceBar;
use quantcore::domain::ohlcv::filter_by_date;
use quantcore::ports::data_port::DataPort;
use quantcore::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, QuantError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(QuantError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        Ok(filter_by_date(&bars, start_date, end_date))
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, QuantError> {
        Ok(self.data.get(symbol).and_then(|bars| {
            let first = bars.first()?;
            let last = bars.last()?;
            Some((first.date, last.date, bars.len()))
        }))
    }
}

/// Captures written reports instead of touching the filesystem.
#[derive(Default)]
pub struct MockReportPort {
    pub written: RefCell<Vec<(String, BacktestResult)>>,
}

impl ReportPort for MockReportPort {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), QuantError> {
        self.written
            .borrow_mut()
            .push((output_path.to_string(), result.clone()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars from 2024-01-01 with high = low = close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: 1000.0,
        })
        .collect()
}

/// Linear ramp with a one-point trading range and volume rising on the last bar.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64, step: f64) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + i as f64 * step;
            PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close - step / 2.0,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: if i + 1 == count { 2000.0 } else { 1000.0 },
            }
        })
        .collect()
}

/// 30 flat bars, 15 falling, 15 rising: drives RSI through both thresholds.
pub fn v_shape_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 30];
    closes.extend((1..=15).map(|k| 100.0 - k as f64));
    closes.extend((1..=15).map(|k| 85.0 + k as f64));
    closes
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, bars: &[PriceBar]) -> std::path::PathBuf {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    let path = dir.join(format!("{}.csv", symbol));
    std::fs::write(&path, content).unwrap();
    path
}
