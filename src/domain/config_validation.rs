//! Configuration validation.
//!
//! Reads the `[backtest]` and `[strategy]` sections through a `ConfigPort`
//! and turns them into typed settings before any data is loaded.

use std::collections::HashMap;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::QuantError;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_OUTPUT_PATH: &str = "backtest.json";

/// Data selection read from `[backtest]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSelection {
    pub symbol: Option<String>,
    pub data_dir: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), QuantError> {
    load_backtest_config(config)?;
    load_data_selection(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), QuantError> {
    load_strategy_config(config).map(|_| ())
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, QuantError> {
    let defaults = BacktestConfig::default();
    let backtest = BacktestConfig {
        initial_capital: parse_number(config, "backtest", "initial_capital")?
            .unwrap_or(defaults.initial_capital),
        commission_rate: parse_number(config, "backtest", "commission_rate")?
            .unwrap_or(defaults.commission_rate),
        slippage_rate: parse_number(config, "backtest", "slippage_rate")?
            .unwrap_or(defaults.slippage_rate),
    };
    backtest.validate()?;
    Ok(backtest)
}

pub fn load_data_selection(config: &dyn ConfigPort) -> Result<DataSelection, QuantError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(QuantError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }

    Ok(DataSelection {
        symbol: non_empty(config.get_string("backtest", "symbol")),
        data_dir: non_empty(config.get_string("backtest", "data_dir"))
            .unwrap_or_else(|| "data".to_string()),
        start_date,
        end_date,
    })
}

/// Build the typed strategy from `[strategy]`: `type` selects the variant and
/// every other key is a numeric parameter.
pub fn load_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, QuantError> {
    let id = non_empty(config.get_string("strategy", "type")).ok_or_else(|| {
        QuantError::ConfigMissing {
            section: "strategy".to_string(),
            key: "type".to_string(),
        }
    })?;

    let mut params = HashMap::new();
    for key in config.keys("strategy") {
        if key == "type" {
            continue;
        }
        if let Some(value) = parse_number(config, "strategy", &key)? {
            params.insert(key, value);
        }
    }

    StrategyConfig::from_params(&id, &params)
}

pub fn output_path(config: &dyn ConfigPort) -> String {
    non_empty(config.get_string("report", "output_path"))
        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, QuantError> {
    match non_empty(config.get_string(section, key)) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| QuantError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a number, got {:?}", raw),
            }),
    }
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<Option<NaiveDate>, QuantError> {
    match non_empty(config.get_string("backtest", field)) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| QuantError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }),
    }
}
