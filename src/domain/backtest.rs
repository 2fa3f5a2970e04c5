//! Backtest orchestration.
//!
//! A run validates its inputs, produces signals, simulates execution and
//! reduces the result to metrics. Runs share no state, so independent runs
//! can execute in parallel via [`run_batch`].

use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span};

use super::error::AlgolabError;
use super::execution::{simulate, ExecutionConfig, SettlementMode};
use super::metrics::Metrics;
use super::ohlcv::{validate_bars, PriceBar};
use super::position::Trade;
use super::signal::{Signal, SignalSeries};
use super::strategy::{SignalGenerator, Strategy};

const EXTERNAL_SIGNALS: &str = "External Signals";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_rate: f64,
    pub slippage_rate: f64,
    pub risk_free_rate: f64,
    pub settlement: SettlementMode,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000.0,
            commission_rate: 0.001,
            slippage_rate: 0.0,
            risk_free_rate: 0.02,
            settlement: SettlementMode::Legacy,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), AlgolabError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(invalid("initial_capital", "initial_capital must be positive"));
        }
        if !(0.0..=1.0).contains(&self.commission_rate) {
            return Err(invalid("commission_rate", "commission_rate must be between 0 and 1"));
        }
        if !(0.0..=1.0).contains(&self.slippage_rate) {
            return Err(invalid("slippage_rate", "slippage_rate must be between 0 and 1"));
        }
        if !(0.0..1.0).contains(&self.risk_free_rate) {
            return Err(invalid("risk_free_rate", "risk_free_rate must be between 0 and 1"));
        }
        Ok(())
    }

    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_rate: self.commission_rate,
            slippage_rate: self.slippage_rate,
            settlement: self.settlement,
        }
    }
}

fn invalid(key: &str, reason: &str) -> AlgolabError {
    AlgolabError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Everything one run produced. Owns all of its data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub strategy: String,
    pub metrics: Metrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
    pub timestamps: Vec<NaiveDateTime>,
    pub signals: SignalSeries,
}

/// Run `strategy` over `bars`.
pub fn run_backtest(
    bars: &[PriceBar],
    strategy: &dyn SignalGenerator,
    config: &BacktestConfig,
) -> Result<BacktestResult, AlgolabError> {
    config.validate()?;
    validate_bars(bars)?;

    let span = info_span!("backtest", strategy = strategy.name(), bars = bars.len());
    let _enter = span.enter();

    let signals = strategy.generate_signals(bars)?;
    signals.ensure_len(bars.len())?;
    Ok(execute(strategy.name(), bars, signals, config))
}

/// Run a pre-computed signal series over `bars`.
pub fn run_with_signals(
    bars: &[PriceBar],
    signals: &SignalSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, AlgolabError> {
    config.validate()?;
    validate_bars(bars)?;
    signals.ensure_len(bars.len())?;

    let span = info_span!("backtest", strategy = EXTERNAL_SIGNALS, bars = bars.len());
    let _enter = span.enter();

    Ok(execute(EXTERNAL_SIGNALS, bars, signals.clone(), config))
}

/// Run each strategy over the same bars in parallel. Results keep the order
/// of `strategies`; one failing run does not affect the others.
pub fn run_batch(
    bars: &[PriceBar],
    strategies: &[Strategy],
    config: &BacktestConfig,
) -> Vec<Result<BacktestResult, AlgolabError>> {
    strategies
        .par_iter()
        .map(|strategy| run_backtest(bars, strategy, config))
        .collect()
}

fn execute(
    name: &str,
    bars: &[PriceBar],
    signals: SignalSeries,
    config: &BacktestConfig,
) -> BacktestResult {
    debug!(
        buys = signals.count(Signal::Buy),
        sells = signals.count(Signal::Sell),
        "signals generated"
    );

    let output = simulate(bars, &signals, config.initial_capital, &config.execution());
    let metrics = Metrics::compute(
        &output.equity_curve,
        &output.trades,
        config.initial_capital,
        config.risk_free_rate,
    );

    info!(
        trades = metrics.total_trades,
        total_return = metrics.total_return,
        "backtest complete"
    );

    BacktestResult {
        strategy: name.to_string(),
        metrics,
        trades: output.trades,
        equity_curve: output.equity_curve,
        timestamps: bars.iter().map(|b| b.timestamp).collect(),
        signals,
    }
}
