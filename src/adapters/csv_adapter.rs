//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row and columns
//! `date,open,high,low,close,volume`.

use crate::domain::error::QuantError;
use crate::domain::ohlcv::{PriceBar, filter_by_date};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn data_err(reason: impl Into<String>) -> QuantError {
    QuantError::Data {
        reason: reason.into(),
    }
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, QuantError> {
    record
        .get(index)
        .ok_or_else(|| data_err(format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| data_err(format!("invalid {} value: {}", name, e)))
}

/// Read a whole OHLCV file, sorted by date.
pub fn load_csv_file(path: &Path) -> Result<Vec<PriceBar>, QuantError> {
    let content = fs::read_to_string(path)
        .map_err(|e| data_err(format!("failed to read {}: {}", path.display(), e)))?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| data_err(format!("CSV parse error: {}", e)))?;

        let date_str = record
            .get(0)
            .ok_or_else(|| data_err("missing date column"))?
            .trim();
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| data_err(format!("invalid date {:?}: {}", date_str, e)))?;

        bars.push(PriceBar {
            date,
            open: parse_field(&record, 1, "open")?,
            high: parse_field(&record, 2, "high")?,
            low: parse_field(&record, 3, "low")?,
            close: parse_field(&record, 4, "close")?,
            volume: parse_field(&record, 5, "volume")?,
        });
    }

    bars.sort_by_key(|b| b.date);
    tracing::debug!(path = %path.display(), bars = bars.len(), "loaded price file");
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, QuantError> {
        let bars = load_csv_file(&self.csv_path(symbol))?;
        Ok(filter_by_date(&bars, start_date, end_date))
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_err(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_err(format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, QuantError> {
        let bars = load_csv_file(&self.csv_path(symbol))?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
