//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close (no SMA seed), then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Defined from the first bar.

use crate::domain::indicator::{exponential_smoothing, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, PriceBar};

pub fn calculate_ema(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::from_simple(
            IndicatorType::Ema(period),
            bars,
            vec![None; bars.len()],
        );
    }

    let closes = closes(bars);
    let raw = exponential_smoothing(&closes, period)
        .into_iter()
        .map(Some)
        .collect();

    IndicatorSeries::from_simple(IndicatorType::Ema(period), bars, raw)
}
