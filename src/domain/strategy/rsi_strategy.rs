//! RSI threshold strategy.
//!
//! Buys on the bar RSI first drops below the oversold threshold and sells on
//! the bar it first rises above the overbought threshold. Staying in a zone
//! does not repeat the signal.

use crate::domain::error::AlgolabError;
use crate::domain::indicator::calculate_rsi;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::SignalSeries;

use super::{SignalGenerator, StrategyParams};

pub const RSI_PERIOD: &str = "rsi_period";
pub const OVERSOLD: &str = "oversold_threshold";
pub const OVERBOUGHT: &str = "overbought_threshold";

const NAME: &str = "RSI Strategy";

#[derive(Debug, Clone, PartialEq)]
pub struct RsiStrategy {
    pub name: String,
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiStrategy {
    pub fn new(rsi_period: usize, oversold: f64, overbought: f64) -> Result<Self, AlgolabError> {
        if !(oversold > 0.0 && oversold < 50.0) {
            return Err(AlgolabError::strategy_param(
                NAME,
                OVERSOLD,
                format!("must be between 0 and 50, got {oversold}"),
            ));
        }
        if !(overbought > 50.0 && overbought < 100.0) {
            return Err(AlgolabError::strategy_param(
                NAME,
                OVERBOUGHT,
                format!("must be between 50 and 100, got {overbought}"),
            ));
        }
        if oversold >= overbought {
            return Err(AlgolabError::strategy_param(
                NAME,
                OVERSOLD,
                "must be less than overbought_threshold",
            ));
        }
        if rsi_period < 2 {
            return Err(AlgolabError::strategy_param(NAME, RSI_PERIOD, "must be >= 2"));
        }
        Ok(RsiStrategy {
            name: NAME.to_string(),
            rsi_period,
            oversold,
            overbought,
        })
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, AlgolabError> {
        Self::new(
            params.period(NAME, RSI_PERIOD, 14)?,
            params.number(OVERSOLD, 30.0),
            params.number(OVERBOUGHT, 70.0),
        )
    }

    fn zone(&self, rsi: Option<f64>) -> i8 {
        match rsi {
            Some(v) if v < self.oversold => 1,
            Some(v) if v > self.overbought => -1,
            _ => 0,
        }
    }
}

impl SignalGenerator for RsiStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Result<SignalSeries, AlgolabError> {
        let states: Vec<i8> = calculate_rsi(bars, self.rsi_period)
            .simple_values()
            .into_iter()
            .map(|rsi| self.zone(rsi))
            .collect();

        Ok(SignalSeries::from_state_changes(&states))
    }
}
