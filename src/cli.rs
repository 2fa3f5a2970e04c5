//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::config_validation::{
    has_strategy, load_csv_dir, load_run_config, load_strategy, RunConfig,
};
use crate::domain::error::AlgolabError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::report::{BacktestReport, RunReport};
use crate::domain::strategy::{SignalGenerator, Strategy, StrategyKind};
use crate::logging::init_tracing;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "algolab", about = "Single-asset strategy backtester")]
pub struct Cli {
    /// Log filter, e.g. `info` or `algolab=debug` (ALGOLAB_LOG overrides)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    /// `text` or `json`
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy INI; defaults to the [strategy] section of --config
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        /// CSV with a `signal` column, one row per bar
        #[arg(long)]
        signals: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run several strategies on the same data and compare them
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, required = true)]
        strategy: Vec<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate run and strategy configuration without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: Option<PathBuf>,
    },
    /// List built-in strategies and their default parameters
    ListStrategies,
    /// List symbols available in the CSV directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    if let Err(e) = init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {e}");
        return ExitCode::from(2);
    }

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Run one subcommand. Errors are returned for the caller to report.
pub fn execute(command: Command) -> Result<(), AlgolabError> {
    match command {
        Command::Backtest {
            config,
            strategy,
            symbol,
            signals,
            output,
        } => run_backtest(
            &config,
            strategy.as_deref(),
            symbol.as_deref(),
            signals.as_deref(),
            output.as_deref(),
        ),
        Command::Compare {
            config,
            strategy,
            symbol,
            output,
        } => run_compare(&config, &strategy, symbol.as_deref(), output.as_deref()),
        Command::Validate { config, strategy } => run_validate(&config, strategy.as_deref()),
        Command::ListStrategies => run_list_strategies(),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AlgolabError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Strategy from `strategy_path` if given, otherwise from the run config's
/// own `[strategy]` section when it has one.
fn resolve_strategy(
    run_config: &dyn ConfigPort,
    strategy_path: Option<&Path>,
) -> Result<Option<Strategy>, AlgolabError> {
    match strategy_path {
        Some(path) => load_strategy(&load_config(path)?).map(Some),
        None if has_strategy(run_config) => load_strategy(run_config).map(Some),
        None => Ok(None),
    }
}

fn load_bars(run: &RunConfig) -> Result<Vec<PriceBar>, AlgolabError> {
    let data_port = CsvAdapter::new(run.csv_dir.clone());
    let bars = data_port.fetch_bars(&run.symbol, run.start_date, run.end_date)?;
    info!(symbol = %run.symbol, bars = bars.len(), "price data loaded");
    Ok(bars)
}

fn run_backtest(
    config_path: &Path,
    strategy_path: Option<&Path>,
    symbol_override: Option<&str>,
    signals_path: Option<&Path>,
    output_path: Option<&Path>,
) -> Result<(), AlgolabError> {
    let adapter = load_config(config_path)?;
    let run = load_run_config(&adapter, symbol_override)?;
    let strategy = resolve_strategy(&adapter, strategy_path)?;

    if strategy.is_none() && signals_path.is_none() {
        return Err(AlgolabError::ConfigMissing {
            section: "strategy".to_string(),
            key: "kind".to_string(),
        });
    }

    let bars = load_bars(&run)?;

    // With both a strategy and external signals, the strategy run is the
    // baseline the signal run is compared against.
    let mut results = Vec::new();
    if let Some(strategy) = &strategy {
        eprintln!("Running {} on {} ({} bars)", strategy.name(), run.symbol, bars.len());
        results.push(backtest_engine::run_backtest(&bars, strategy, &run.backtest)?);
    }
    if let Some(path) = signals_path {
        info!(path = %path.display(), "loading external signals");
        let signals = CsvAdapter::read_signals(path)?.align(&bars)?;
        eprintln!("Running external signals on {} ({} bars)", run.symbol, bars.len());
        results.push(backtest_engine::run_with_signals(&bars, &signals, &run.backtest)?);
    }

    finish(run, results, output_path)
}

fn run_compare(
    config_path: &Path,
    strategy_paths: &[PathBuf],
    symbol_override: Option<&str>,
    output_path: Option<&Path>,
) -> Result<(), AlgolabError> {
    let adapter = load_config(config_path)?;
    let run = load_run_config(&adapter, symbol_override)?;
    let strategies = strategy_paths
        .iter()
        .map(|path| load_strategy(&load_config(path)?))
        .collect::<Result<Vec<_>, _>>()?;

    let bars = load_bars(&run)?;
    eprintln!(
        "Comparing {} strategies on {} ({} bars)",
        strategies.len(),
        run.symbol,
        bars.len()
    );

    let mut results = Vec::with_capacity(strategies.len());
    let mut first_error = None;
    for (strategy, outcome) in strategies
        .iter()
        .zip(backtest_engine::run_batch(&bars, &strategies, &run.backtest))
    {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "run failed");
                eprintln!("warning: skipping {} ({})", strategy.name(), e);
                first_error.get_or_insert(e);
            }
        }
    }

    if results.is_empty() {
        if let Some(e) = first_error {
            return Err(e);
        }
    }
    finish(run, results, output_path)
}

fn finish(
    run: RunConfig,
    results: Vec<BacktestResult>,
    output_path: Option<&Path>,
) -> Result<(), AlgolabError> {
    let report = BacktestReport::new(Some(run.symbol), run.backtest, results);
    for run_report in &report.runs {
        print_summary(run_report);
    }

    if let Some(output) = output_path {
        JsonReportAdapter::new().write(&report, &output.to_string_lossy())?;
        eprintln!("\nReport written to: {}", output.display());
    }
    Ok(())
}

fn print_summary(run: &RunReport) {
    let m = &run.result.metrics;
    let a = &run.analytics;

    eprintln!("\n=== {} ===", run.result.strategy);
    eprintln!("Total Return:     {:.2}", m.total_return);
    eprintln!("ROI:              {:.2}%", m.roi);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", a.sortino_ratio);
    eprintln!("Max Drawdown:     {:.1}%", m.max_drawdown);
    eprintln!(
        "Total Trades:     {} ({} won, {} lost)",
        m.total_trades, m.winning_trades, m.losing_trades
    );
    eprintln!("Win Rate:         {:.1}%", m.win_rate);
    eprintln!("Profit Factor:    {:.2}", m.profit_factor);
    eprintln!("Expectancy:       {:.2}", a.expectancy);

    if let Some(diff) = &run.difference_from_baseline {
        eprintln!("--- vs baseline ---");
        eprintln!("  Total Return:   {:+.2}", diff.total_return);
        eprintln!("  Sharpe Ratio:   {:+.2}", diff.sharpe_ratio);
        eprintln!("  Max Drawdown:   {:+.1}%", diff.max_drawdown);
        eprintln!("  Win Rate:       {:+.1}%", diff.win_rate);
        eprintln!("  Trades:         {:+}", diff.total_trades);
    }
}

fn run_validate(config_path: &Path, strategy_path: Option<&Path>) -> Result<(), AlgolabError> {
    let adapter = load_config(config_path)?;
    let run = load_run_config(&adapter, None)?;

    eprintln!("Run configuration:");
    eprintln!("  symbol:          {}", run.symbol);
    eprintln!("  csv_dir:         {}", run.csv_dir.display());
    eprintln!("  initial_capital: {}", run.backtest.initial_capital);
    eprintln!("  commission_rate: {}", run.backtest.commission_rate);
    eprintln!("  slippage_rate:   {}", run.backtest.slippage_rate);
    eprintln!("  settlement:      {}", run.backtest.settlement);

    match resolve_strategy(&adapter, strategy_path)? {
        Some(strategy) => eprintln!("\nStrategy: {} ({})", strategy.name(), strategy.kind()),
        None => eprintln!("\nNo strategy configured"),
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_list_strategies() -> Result<(), AlgolabError> {
    for kind in StrategyKind::all() {
        let params: Vec<String> = kind
            .default_params()
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        println!("{}\t{}", kind.id(), params.join(" "));
    }
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), AlgolabError> {
    let adapter = load_config(config_path)?;
    let data_port = CsvAdapter::new(load_csv_dir(&adapter)?);

    let symbols = data_port.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_info(config_path: &Path, symbol_override: Option<&str>) -> Result<(), AlgolabError> {
    let adapter = load_config(config_path)?;
    let run = load_run_config(&adapter, symbol_override)?;
    let data_port = CsvAdapter::new(run.csv_dir);

    match data_port.get_data_range(&run.symbol)? {
        Some((first, last, count)) => println!("{}: {} bars, {} to {}", run.symbol, count, first, last),
        None => eprintln!("{}: no data found", run.symbol),
    }
    Ok(())
}
