//! MACD level strategy.
//!
//! Unlike the crossover strategies this one is continuous: every bar with the
//! MACD line above its signal line is a buy and every bar below is a sell.
//! The simulator ignores repeated buys while long and repeated sells while
//! flat, so the effective trades still happen at the crossings.

use crate::domain::error::AlgolabError;
use crate::domain::indicator::calculate_macd;
use crate::domain::indicator::macd::macd_lines;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{Signal, SignalSeries};

use super::{compare_state, SignalGenerator, StrategyParams};

pub const FAST_PERIOD: &str = "fast_period";
pub const SLOW_PERIOD: &str = "slow_period";
pub const SIGNAL_PERIOD: &str = "signal_period";

const NAME: &str = "MACD Strategy";

#[derive(Debug, Clone, PartialEq)]
pub struct MacdStrategy {
    pub name: String,
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl MacdStrategy {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, AlgolabError> {
        if fast_period < 1 {
            return Err(AlgolabError::strategy_param(NAME, FAST_PERIOD, "must be >= 1"));
        }
        if signal_period < 1 {
            return Err(AlgolabError::strategy_param(NAME, SIGNAL_PERIOD, "must be >= 1"));
        }
        if fast_period >= slow_period {
            return Err(AlgolabError::strategy_param(
                NAME,
                FAST_PERIOD,
                format!("must be less than slow_period ({fast_period} >= {slow_period})"),
            ));
        }
        Ok(MacdStrategy {
            name: NAME.to_string(),
            fast_period,
            slow_period,
            signal_period,
        })
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, AlgolabError> {
        Self::new(
            params.period(NAME, FAST_PERIOD, 12)?,
            params.period(NAME, SLOW_PERIOD, 26)?,
            params.period(NAME, SIGNAL_PERIOD, 9)?,
        )
    }
}

impl SignalGenerator for MacdStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Result<SignalSeries, AlgolabError> {
        let series = calculate_macd(bars, self.fast_period, self.slow_period, self.signal_period);
        let (lines, signals) = macd_lines(&series);

        let out = lines
            .into_iter()
            .zip(signals)
            .map(|(line, signal)| Signal::from_sign(compare_state(line, signal)))
            .collect();

        Ok(SignalSeries::new(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::bars_from_closes;

    #[test]
    fn validation() {
        assert!(MacdStrategy::new(0, 26, 9).is_err());
        assert!(MacdStrategy::new(12, 26, 0).is_err());
        assert!(MacdStrategy::new(26, 12, 9).is_err());
        assert!(MacdStrategy::new(12, 12, 9).is_err());
        assert!(MacdStrategy::new(12, 26, 9).is_ok());
    }

    #[test]
    fn from_params_overrides() {
        let params = StrategyParams::new().with(FAST_PERIOD, 5.0).with(SLOW_PERIOD, 35.0);
        let s = MacdStrategy::from_params(&params).unwrap();
        assert_eq!((s.fast_period, s.slow_period, s.signal_period), (5, 35, 9));
    }

    #[test]
    fn rising_prices_buy_on_every_bar_after_first() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let signals = MacdStrategy::new(3, 6, 3)
            .unwrap()
            .generate_signals(&bars_from_closes(&closes))
            .unwrap();

        // line == signal == 0 on the first bar
        assert_eq!(signals.get(0), Some(Signal::Hold));
        assert_eq!(signals.count(Signal::Buy), 29);
    }

    #[test]
    fn falling_prices_sell_continuously() {
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
        let signals = MacdStrategy::new(3, 6, 3)
            .unwrap()
            .generate_signals(&bars_from_closes(&closes))
            .unwrap();
        assert_eq!(signals.count(Signal::Sell), 29);
    }

    #[test]
    fn flat_prices_hold() {
        let signals = MacdStrategy::new(12, 26, 9)
            .unwrap()
            .generate_signals(&bars_from_closes(&[100.0; 40]))
            .unwrap();
        assert_eq!(signals.count(Signal::Hold), 40);
    }
}
