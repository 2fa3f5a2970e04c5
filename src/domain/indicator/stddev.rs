//! Rolling Standard Deviation indicator.
//!
//! Sample standard deviation over n closing prices, the same dispersion
//! measure the Bollinger bands use.
//! Warmup: first (n-1) bars are undefined; periods below 2 are never defined.

use crate::domain::indicator::{rolling_sample_stddev, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, PriceBar};

pub fn calculate_stddev(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let closes = closes(bars);
    IndicatorSeries::from_simple(
        IndicatorType::Stddev(period),
        bars,
        rolling_sample_stddev(&closes, period),
    )
}
