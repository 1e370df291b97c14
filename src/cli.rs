//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, load_csv_file};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    DataSelection, load_backtest_config, load_data_selection, load_strategy_config, output_path,
    validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::QuantError;
use crate::domain::indicator::compute_indicators;
use crate::domain::ohlcv::{self, PriceBar};
use crate::domain::recommendation::recommend;
use crate::domain::risk::{risk_metrics, risk_score};
use crate::domain::strategy::StrategyConfig;
use crate::domain::trend::{DEFAULT_HORIZON, score_trend_with_horizon};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "quantcore", about = "Indicators, trend scoring and strategy backtests")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the indicator set of a price file as JSON
    Indicators {
        #[arg(long)]
        data: PathBuf,
    },
    /// Score the trend of a price file and print a recommendation
    Trend {
        #[arg(long)]
        data: PathBuf,
        #[arg(long, default_value_t = DEFAULT_HORIZON)]
        horizon: usize,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Print risk metrics and score over the closes of a price file
    Risk {
        #[arg(long)]
        data: PathBuf,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(long)]
        data_dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, symbol.as_deref(), output.as_deref())
            }
        }
        Command::Indicators { data } => run_indicators(&data),
        Command::Trend {
            data,
            horizon,
            symbol,
        } => run_trend(&data, horizon, symbol.as_deref()),
        Command::Risk { data } => run_risk(&data),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
    }
}

fn fail(err: QuantError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e.into()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

/// Settings for one backtest run, resolved from config plus CLI overrides.
#[derive(Debug, Clone)]
pub struct BacktestPlan {
    pub symbol: String,
    pub selection: DataSelection,
    pub strategy: StrategyConfig,
    pub backtest: BacktestConfig,
    pub output_path: String,
}

pub fn build_plan(
    config: &FileConfigAdapter,
    symbol_override: Option<&str>,
    output_override: Option<&Path>,
) -> Result<BacktestPlan, QuantError> {
    validate_backtest_config(config)?;
    validate_strategy_config(config)?;

    let selection = load_data_selection(config)?;
    let symbol = symbol_override
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .or_else(|| selection.symbol.as_ref().map(|s| s.to_uppercase()))
        .ok_or_else(|| QuantError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        })?;

    Ok(BacktestPlan {
        symbol,
        strategy: load_strategy_config(config)?,
        backtest: load_backtest_config(config)?,
        output_path: output_override
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| output_path(config)),
        selection,
    })
}

fn run_backtest(config_path: &Path, symbol: Option<&str>, output: Option<&Path>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let plan = match build_plan(&config, symbol, output) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let data_port = CsvAdapter::new(PathBuf::from(&plan.selection.data_dir));
    let report = JsonReportAdapter::new();

    match run_backtest_pipeline(&data_port, &report, &plan) {
        Ok(result) => {
            print_summary(&plan, &result);
            eprintln!("\nReport written to: {}", plan.output_path);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Fetch data, run the backtest and persist the result.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    plan: &BacktestPlan,
) -> Result<BacktestResult, QuantError> {
    let bars = data_port.fetch_ohlcv(
        &plan.symbol,
        plan.selection.start_date,
        plan.selection.end_date,
    )?;
    eprintln!(
        "Running {} on {}: {} bars",
        plan.strategy.kind(),
        plan.symbol,
        bars.len()
    );

    let result = backtest_engine::run_backtest(&bars, &plan.strategy, &plan.backtest)?;
    report.write(&result, &plan.output_path)?;
    Ok(result)
}

fn print_summary(plan: &BacktestPlan, result: &BacktestResult) {
    let m = &result.metrics;
    eprintln!("\n=== {} / {} ===", plan.symbol, plan.strategy.kind());
    eprintln!("Final Value:      {:.2}", result.final_value);
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", m.sortino_ratio);
    eprintln!(
        "Max Drawdown:     -{:.1}% ({} bars)",
        m.max_drawdown * 100.0,
        result.max_drawdown_duration
    );
    eprintln!("Total Trades:     {}", m.trades.total_trades);
    eprintln!("Win Rate:         {:.1}%", m.trades.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", m.trades.profit_factor);
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let plan = match build_plan(&config, None, None) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    eprintln!("Config validated successfully");

    eprintln!("\nStrategy:");
    eprintln!("  {} ({})", plan.strategy.kind(), plan.strategy.kind().description());
    match serde_json::to_string(&plan.strategy) {
        Ok(params) => eprintln!("  params: {params}"),
        Err(e) => return fail(e.into()),
    }

    eprintln!("\nData:");
    eprintln!("  symbol:   {}", plan.symbol);
    eprintln!("  data_dir: {}", plan.selection.data_dir);
    let range = |d: Option<chrono::NaiveDate>| d.map_or("open".to_string(), |d| d.to_string());
    eprintln!(
        "  range:    {} to {}",
        range(plan.selection.start_date),
        range(plan.selection.end_date)
    );

    eprintln!("\nExecution:");
    eprintln!("  initial_capital: {}", plan.backtest.initial_capital);
    eprintln!("  commission_rate: {}", plan.backtest.commission_rate);
    eprintln!("  slippage_rate:   {}", plan.backtest.slippage_rate);
    eprintln!("  output:          {}", plan.output_path);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn load_bars(path: &Path) -> Result<Vec<PriceBar>, QuantError> {
    let bars = load_csv_file(path)?;
    ohlcv::validate_series(&bars)?;
    Ok(bars)
}

fn run_indicators(data: &Path) -> ExitCode {
    let result = load_bars(data).and_then(|bars| compute_indicators(&bars));
    match result {
        Ok(set) => print_json(&set),
        Err(e) => fail(e),
    }
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

fn run_trend(data: &Path, horizon: usize, symbol: Option<&str>) -> ExitCode {
    let symbol = symbol.map_or_else(|| symbol_from_path(data), str::to_uppercase);
    let result = load_bars(data).and_then(|bars| {
        let trend = score_trend_with_horizon(&bars, horizon)?;
        let risk = risk_metrics(&ohlcv::closes(&bars))?;
        let recommendation = recommend(&symbol, &trend, Some(&risk));
        Ok(serde_json::json!({
            "symbol": symbol,
            "trend": trend,
            "recommendation": recommendation,
        }))
    });

    match result {
        Ok(report) => print_json(&report),
        Err(e) => fail(e),
    }
}

fn run_risk(data: &Path) -> ExitCode {
    let result = load_bars(data).and_then(|bars| {
        let metrics = risk_metrics(&ohlcv::closes(&bars))?;
        let score = risk_score(&metrics);
        Ok(serde_json::json!({
            "metrics": metrics,
            "score": score,
        }))
    });

    match result {
        Ok(report) => print_json(&report),
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating strategy: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let strategy = match load_strategy_config(&config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    eprintln!("\nStrategy: {} ({})", strategy.kind(), strategy.kind().description());
    match serde_json::to_string(&strategy) {
        Ok(params) => eprintln!("  Parameters: {params}"),
        Err(e) => return fail(e.into()),
    }

    eprintln!("\nStrategy configuration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(data_dir: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());

    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data_dir.display());
        return ExitCode::SUCCESS;
    }

    for symbol in &symbols {
        match adapter.get_data_range(symbol) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} bars, {} to {}", symbol, count, first, last)
            }
            Ok(None) => println!("{}: no data", symbol),
            Err(e) => eprintln!("warning: skipping {} ({})", symbol, e),
        }
    }
    eprintln!("{} symbols found", symbols.len());
    ExitCode::SUCCESS
}
