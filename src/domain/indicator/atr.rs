//! ATR (Average True Range) indicator.
//!
//! TR = max(high - low, |high - prev_close|, |low - prev_close|)
//! The first bar has no previous close, so its TR is high - low.
//! ATR is the simple rolling mean of TR over n bars.

use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let ranges = true_ranges(bars);
    IndicatorSeries::from_simple(IndicatorType::Atr(period), bars, rolling_mean(&ranges, period))
}

pub(crate) fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}
