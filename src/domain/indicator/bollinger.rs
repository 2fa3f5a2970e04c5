//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::{
    rolling_mean, rolling_sample_stddev, IndicatorPoint, IndicatorSeries, IndicatorType,
    IndicatorValue,
};
use crate::domain::ohlcv::{closes, PriceBar};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

pub fn calculate_bollinger(bars: &[PriceBar], period: usize, multiplier: f64) -> IndicatorSeries {
    let closes = closes(bars);
    let middles = rolling_mean(&closes, period);
    let stddevs = rolling_sample_stddev(&closes, period);
    // A negative width would invert the bands.
    let mult = multiplier.abs();

    let values = bars
        .iter()
        .zip(middles.into_iter().zip(stddevs))
        .map(|(bar, (middle, stddev))| {
            let value = match (middle, stddev) {
                (Some(middle), Some(stddev)) => Some(IndicatorValue::Bollinger {
                    upper: middle + mult * stddev,
                    middle,
                    lower: middle - mult * stddev,
                }),
                _ => None,
            };
            IndicatorPoint {
                timestamp: bar.timestamp,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100: (mult * 100.0).round() as u32,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::bars_from_closes;

    fn bands(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.values[i].value {
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => (upper, middle, lower),
            _ => panic!("Expected Bollinger value at {}", i),
        }
    }

    #[test]
    fn bollinger_warmup() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);

        assert!(!series.values[0].is_defined());
        assert!(!series.values[1].is_defined());
        assert!(series.values[2].is_defined());
        assert!(series.values[4].is_defined());
    }

    #[test]
    fn bollinger_constant_values() {
        let bars = bars_from_closes(&[100.0; 5]);
        let series = calculate_bollinger(&bars, 3, 2.0);
        let (upper, middle, lower) = bands(&series, 2);

        assert!((middle - 100.0).abs() < f64::EPSILON);
        assert!((upper - 100.0).abs() < f64::EPSILON);
        assert!((lower - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);
        let (upper, middle, lower) = bands(&series, 2);

        // sample variance of 10,20,30 = 200/2 = 100
        assert!((middle - 20.0).abs() < 1e-10);
        assert!((upper - 40.0).abs() < 1e-10);
        assert!((lower - 0.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 1.0);
        let (upper, _, lower) = bands(&series, 2);

        assert!((upper - 30.0).abs() < 1e-10);
        assert!((lower - 10.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_band_ordering() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + ((i * 7) % 11) as f64).collect();
        let series = calculate_bollinger(&bars_from_closes(&closes), 20, 2.0);

        for i in 19..60 {
            let (upper, middle, lower) = bands(&series, i);
            assert!(upper >= middle && middle >= lower, "index {}", i);
        }
    }

    #[test]
    fn bollinger_negative_multiplier_keeps_ordering() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, -2.0);
        let (upper, middle, lower) = bands(&series, 2);
        assert!(upper >= middle && middle >= lower);
    }

    #[test]
    fn bollinger_indicator_type() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, DEFAULT_PERIOD, DEFAULT_MULTIPLIER);

        assert_eq!(
            series.indicator_type,
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200
            }
        );
        assert_eq!(series.defined_count(), 0);
    }
}
