//! JSON report adapter implementing ReportPort.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantError;
use crate::ports::report_port::ReportPort;

/// Writes the full backtest result as pretty-printed JSON.
#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), QuantError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(result)?;
        fs::write(path, json)?;
        tracing::info!(path = output_path, "report written");
        Ok(())
    }
}
