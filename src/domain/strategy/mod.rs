//! Signal-generating strategies and the registry that builds them.
//!
//! Every strategy turns a price series into a [`SignalSeries`] of the same
//! length. Parameters are validated when the strategy is constructed, before
//! any price data is seen.

pub mod ma_crossover;
pub mod macd_strategy;
pub mod rsi_strategy;

pub use ma_crossover::MaCrossover;
pub use macd_strategy::MacdStrategy;
pub use rsi_strategy::RsiStrategy;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::AlgolabError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::SignalSeries;

/// Anything that can produce one signal per bar.
pub trait SignalGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate_signals(&self, bars: &[PriceBar]) -> Result<SignalSeries, AlgolabError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MovingAverageCrossover,
    Rsi,
    Macd,
}

impl StrategyKind {
    pub fn all() -> &'static [StrategyKind] {
        &[
            StrategyKind::MovingAverageCrossover,
            StrategyKind::Rsi,
            StrategyKind::Macd,
        ]
    }

    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::MovingAverageCrossover => "moving_average_crossover",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Macd => "macd",
        }
    }

    pub fn default_params(self) -> StrategyParams {
        let pairs: &[(&str, f64)] = match self {
            StrategyKind::MovingAverageCrossover => &[
                (ma_crossover::FAST_PERIOD, 10.0),
                (ma_crossover::SLOW_PERIOD, 20.0),
            ],
            StrategyKind::Rsi => &[
                (rsi_strategy::RSI_PERIOD, 14.0),
                (rsi_strategy::OVERSOLD, 30.0),
                (rsi_strategy::OVERBOUGHT, 70.0),
            ],
            StrategyKind::Macd => &[
                (macd_strategy::FAST_PERIOD, 12.0),
                (macd_strategy::SLOW_PERIOD, 26.0),
                (macd_strategy::SIGNAL_PERIOD, 9.0),
            ],
        };
        pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = AlgolabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moving_average_crossover" | "ma_crossover" => Ok(StrategyKind::MovingAverageCrossover),
            "rsi" => Ok(StrategyKind::Rsi),
            "macd" => Ok(StrategyKind::Macd),
            _ => Err(AlgolabError::UnknownStrategy {
                kind: s.to_string(),
            }),
        }
    }
}

/// Named numeric strategy parameters. Keys a strategy does not recognize
/// are ignored; missing keys fall back to that strategy's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(BTreeMap<String, f64>);

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub(crate) fn number(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// A window length: a finite, non-negative whole number.
    pub(crate) fn period(&self, strategy: &str, key: &str, default: usize) -> Result<usize, AlgolabError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(AlgolabError::strategy_param(
                strategy,
                key,
                format!("must be a non-negative whole number, got {value}"),
            ));
        }
        Ok(value as usize)
    }
}

impl FromIterator<(String, f64)> for StrategyParams {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        StrategyParams(iter.into_iter().collect())
    }
}

/// The built-in strategies.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    MovingAverageCrossover(MaCrossover),
    Rsi(RsiStrategy),
    Macd(MacdStrategy),
}

impl Strategy {
    /// Registry lookup: build and validate a strategy of `kind` from `params`.
    pub fn build(kind: StrategyKind, params: &StrategyParams) -> Result<Self, AlgolabError> {
        Ok(match kind {
            StrategyKind::MovingAverageCrossover => {
                Strategy::MovingAverageCrossover(MaCrossover::from_params(params)?)
            }
            StrategyKind::Rsi => Strategy::Rsi(RsiStrategy::from_params(params)?),
            StrategyKind::Macd => Strategy::Macd(MacdStrategy::from_params(params)?),
        })
    }

    /// Build from a registry id such as `"rsi"` or `"ma_crossover"`.
    pub fn from_id(id: &str, params: &StrategyParams) -> Result<Self, AlgolabError> {
        Self::build(id.parse()?, params)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::MovingAverageCrossover(_) => StrategyKind::MovingAverageCrossover,
            Strategy::Rsi(_) => StrategyKind::Rsi,
            Strategy::Macd(_) => StrategyKind::Macd,
        }
    }

    /// Replace the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match &mut self {
            Strategy::MovingAverageCrossover(s) => s.name = name,
            Strategy::Rsi(s) => s.name = name,
            Strategy::Macd(s) => s.name = name,
        }
        self
    }

    fn inner(&self) -> &dyn SignalGenerator {
        match self {
            Strategy::MovingAverageCrossover(s) => s,
            Strategy::Rsi(s) => s,
            Strategy::Macd(s) => s,
        }
    }
}

impl SignalGenerator for Strategy {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Result<SignalSeries, AlgolabError> {
        self.inner().generate_signals(bars)
    }
}

/// Per-bar state of a two-line comparison: +1 above, -1 below, 0 when equal
/// or when either side is undefined.
pub(crate) fn compare_state(a: Option<f64>, b: Option<f64>) -> i8 {
    match (a, b) {
        (Some(a), Some(b)) if a > b => 1,
        (Some(a), Some(b)) if a < b => -1,
        _ => 0,
    }
}
