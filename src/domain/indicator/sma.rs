//! Simple Moving Average over closes, and the volume moving average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, PriceBar};

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let closes = closes(bars);
    IndicatorSeries::from_simple(
        IndicatorType::Sma(period),
        bars,
        rolling_mean(&closes, period),
    )
}

pub fn calculate_volume_sma(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    IndicatorSeries::from_simple(
        IndicatorType::VolumeSma(period),
        bars,
        rolling_mean(&volumes, period),
    )
}
