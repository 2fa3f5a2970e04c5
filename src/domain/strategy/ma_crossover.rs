//! Moving average crossover.
//!
//! Buys on the bar where the fast SMA moves above the slow SMA and sells on
//! the bar where it moves below. Bars where the relationship is unchanged
//! hold.

use crate::domain::error::AlgolabError;
use crate::domain::indicator::calculate_sma;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::SignalSeries;

use super::{compare_state, SignalGenerator, StrategyParams};

pub const FAST_PERIOD: &str = "fast_period";
pub const SLOW_PERIOD: &str = "slow_period";

const NAME: &str = "Moving Average Crossover";

#[derive(Debug, Clone, PartialEq)]
pub struct MaCrossover {
    pub name: String,
    pub fast_period: usize,
    pub slow_period: usize,
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self, AlgolabError> {
        if fast_period >= slow_period {
            return Err(AlgolabError::strategy_param(
                NAME,
                FAST_PERIOD,
                format!("must be less than slow_period ({fast_period} >= {slow_period})"),
            ));
        }
        if fast_period < 1 {
            return Err(AlgolabError::strategy_param(NAME, FAST_PERIOD, "must be >= 1"));
        }
        if slow_period < 2 {
            return Err(AlgolabError::strategy_param(NAME, SLOW_PERIOD, "must be >= 2"));
        }
        Ok(MaCrossover {
            name: NAME.to_string(),
            fast_period,
            slow_period,
        })
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, AlgolabError> {
        Self::new(
            params.period(NAME, FAST_PERIOD, 10)?,
            params.period(NAME, SLOW_PERIOD, 20)?,
        )
    }
}

impl SignalGenerator for MaCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Result<SignalSeries, AlgolabError> {
        let fast = calculate_sma(bars, self.fast_period).simple_values();
        let slow = calculate_sma(bars, self.slow_period).simple_values();

        let states: Vec<i8> = fast
            .into_iter()
            .zip(slow)
            .map(|(f, s)| compare_state(f, s))
            .collect();

        Ok(SignalSeries::from_state_changes(&states))
    }
}
