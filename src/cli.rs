//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{
    BacktestConfig, BacktestResult, BacktestRunner, DEFAULT_INITIAL_CAPITAL,
};
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::FlintsteelError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::metrics::DEFAULT_RISK_FREE_RATE;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "flintsteel", about = "Trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the instrument code from the config file
        #[arg(long)]
        code: Option<String>,
        /// Override the CSV data directory from the config file
        #[arg(long)]
        data: Option<PathBuf>,
        /// Directory for the CSV report; omit to skip report output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running anything
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            code,
            data,
            output,
        } => run_backtest(&config, code.as_deref(), data.as_ref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(e: &FlintsteelError) -> ExitCode {
    eprintln!("error: {e}");
    e.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, FlintsteelError> {
    FileConfigAdapter::from_file(path)
}

fn run_backtest(
    config_path: &PathBuf,
    code_override: Option<&str>,
    data_override: Option<&PathBuf>,
    output_override: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(&e);
    }

    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    eprintln!("Strategy: {} ({})", strategy.name(), strategy);

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let code = match code_override {
        Some(c) => c.to_string(),
        None => match adapter.get_string("backtest", "code") {
            Some(c) => c,
            None => {
                let e = FlintsteelError::ConfigMissing {
                    section: "backtest".to_string(),
                    key: "code".to_string(),
                };
                return fail(&e);
            }
        },
    };

    let data_path = match data_override {
        Some(p) => p.clone(),
        None => PathBuf::from(adapter.get_string("backtest", "data_path").unwrap_or_else(|| ".".to_string())),
    };

    let (start_date, end_date) = match config_dates(&adapter) {
        Ok(dates) => dates,
        Err(e) => return fail(&e),
    };

    eprintln!("Fetching {} from {}", code, data_path.display());
    let data_port = CsvAdapter::new(data_path);
    let bars = match data_port.fetch_ohlcv(&code, start_date, end_date) {
        Ok(bars) => bars,
        Err(e) => return fail(&e),
    };
    eprintln!("Loaded {} bars", bars.len());

    let series = PriceSeries::new(code, bars);
    let mut runner = BacktestRunner::new(strategy, bt_config);
    let result = match runner.run(&series) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    let list_transactions = adapter.get_bool("report", "list_transactions", true);
    print_result(&result, list_transactions);

    let output = output_override.cloned().or_else(|| {
        adapter
            .get_string("report", "output_path")
            .map(PathBuf::from)
    });
    if let Some(output) = output {
        let reporter = CsvReportAdapter::new();
        if let Err(e) = reporter.write(&result, &output.display().to_string()) {
            return fail(&e);
        }
        eprintln!("Report written to {}", output.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(&e);
    }
    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    if let Err(e) = build_backtest_config(&adapter) {
        return fail(&e);
    }

    println!("{}: OK ({})", config_path.display(), strategy);
    ExitCode::SUCCESS
}

fn print_result(result: &BacktestResult, list_transactions: bool) {
    println!("Backtest: {} / {}", result.code, result.strategy.name());
    println!("  Transactions:  {}", result.transactions.len());
    if list_transactions {
        for tx in &result.transactions {
            println!(
                "    {} {} {} @ {:.2} (cash {:.2})",
                tx.date,
                tx.side.as_str(),
                tx.units,
                tx.price,
                tx.resulting_cash
            );
        }
    }
    if !result.rejections.is_empty() {
        eprintln!("  {} order(s) rejected:", result.rejections.len());
        for r in &result.rejections {
            eprintln!("    {} {}: {}", r.date, r.side.as_str(), r.reason);
        }
    }

    println!(
        "  Holdings:      {} units, {:.2} cash",
        result.final_units, result.final_cash
    );
    println!(
        "  Total return:  {:.2}%",
        result.metrics.total_return * 100.0
    );
    if result.metrics.sharpe_ratio.is_nan() {
        println!("  Sharpe ratio:  undefined");
    } else {
        println!("  Sharpe ratio:  {:.2}", result.metrics.sharpe_ratio);
    }
    println!(
        "  Max drawdown:  {:.2}%",
        result.metrics.max_drawdown * 100.0
    );
}

fn get_period(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, FlintsteelError> {
    let value = config.get_int("strategy", key, default as i64);
    usize::try_from(value).map_err(|_| FlintsteelError::ConfigInvalid {
        section: "strategy".to_string(),
        key: key.to_string(),
        reason: "period must be non-negative".to_string(),
    })
}

/// Builds the strategy named in `[strategy]`, falling back to each
/// strategy's usual defaults for any parameter left out.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<Strategy, FlintsteelError> {
    let name = config
        .get_string("strategy", "name")
        .ok_or_else(|| FlintsteelError::ConfigMissing {
            section: "strategy".to_string(),
            key: "name".to_string(),
        })?;

    match name.as_str() {
        "ma" => Strategy::moving_average_crossover(
            get_period(config, "short_period", 50)?,
            get_period(config, "long_period", 200)?,
        ),
        "rsi" => Strategy::rsi_threshold(
            get_period(config, "rsi_period", 14)?,
            config.get_double("strategy", "rsi_lower", 30.0),
            config.get_double("strategy", "rsi_upper", 70.0),
        ),
        "bollinger" => Strategy::bollinger_breakout(
            get_period(config, "bbands_period", 20)?,
            config.get_double("strategy", "bbands_devfactor", 2.0),
        ),
        "macd" => Strategy::macd_crossover(
            get_period(config, "macd_fast", DEFAULT_FAST)?,
            get_period(config, "macd_slow", DEFAULT_SLOW)?,
            get_period(config, "macd_signal", DEFAULT_SIGNAL)?,
        ),
        "buy_and_hold" => Ok(Strategy::BuyAndHold),
        _ => Err(FlintsteelError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "name".to_string(),
            reason: format!("unknown strategy '{}'", name),
        }),
    }
}

/// The moving-average strategy ships with a protective stop; everything
/// else leaves risk controls off unless the config turns them on.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, FlintsteelError> {
    let (stop_default, take_default) = match config.get_string("strategy", "name").as_deref() {
        Some("ma") => (0.02, 0.05),
        _ => (0.0, 0.0),
    };

    let bt_config = BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        risk_free_rate: config.get_double("backtest", "risk_free_rate", DEFAULT_RISK_FREE_RATE),
        stop_loss: config.get_double("strategy", "stop_loss", stop_default),
        take_profit: config.get_double("strategy", "take_profit", take_default),
    };
    bt_config.validate()?;
    Ok(bt_config)
}

fn config_dates(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), FlintsteelError> {
    let parse = |key: &str| -> Result<Option<NaiveDate>, FlintsteelError> {
        match config.get_string("backtest", key) {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map(Some).map_err(|_| {
                FlintsteelError::ConfigInvalid {
                    section: "backtest".to_string(),
                    key: key.to_string(),
                    reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
                }
            }),
        }
    };
    Ok((parse("start_date")?, parse("end_date")?))
}
