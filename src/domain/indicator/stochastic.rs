//! Stochastic oscillator.
//!
//! Raw %K = 100 × (close - lowest_low) / (highest_high - lowest_low) over n bars,
//! undefined when the window has no range.
//! %K = rolling mean of raw %K over `smooth_k`
//! %D = rolling mean of %K over `smooth_d`
//!
//! A point is defined once both %K and %D are.

use crate::domain::indicator::{
    rolling_mean_defined, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_SMOOTH: usize = 3;

pub fn calculate_stochastic(
    bars: &[PriceBar],
    period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> IndicatorSeries {
    let raw_k = raw_percent_k(bars, period);
    let k = rolling_mean_defined(&raw_k, smooth_k);
    let d = rolling_mean_defined(&k, smooth_d);

    let values = bars
        .iter()
        .zip(k.into_iter().zip(d))
        .map(|(bar, pair)| IndicatorPoint {
            timestamp: bar.timestamp,
            value: match pair {
                (Some(k), Some(d)) => Some(IndicatorValue::Stochastic { k, d }),
                _ => None,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Stochastic {
            period,
            smooth_k,
            smooth_d,
        },
        values,
    }
}

fn raw_percent_k(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range == 0.0 {
                None
            } else {
                Some(100.0 * (bars[i].close - lowest) / range)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::bars_from_hlc;

    fn kd(series: &IndicatorSeries, i: usize) -> (f64, f64) {
        match series.values[i].value {
            Some(IndicatorValue::Stochastic { k, d }) => (k, d),
            _ => panic!("Expected Stochastic value at {}", i),
        }
    }

    #[test]
    fn stochastic_unsmoothed_close_at_high() {
        let bars = bars_from_hlc(&[(10.0, 5.0, 7.0), (12.0, 6.0, 12.0)]);
        let series = calculate_stochastic(&bars, 2, 1, 1);
        let (k, d) = kd(&series, 1);

        assert!((k - 100.0).abs() < f64::EPSILON);
        assert!((d - 100.0).abs() < f64::EPSILON);
        assert!(!series.values[0].is_defined());
    }

    #[test]
    fn stochastic_close_at_low_is_zero() {
        let bars = bars_from_hlc(&[(10.0, 5.0, 7.0), (9.0, 4.0, 4.0)]);
        let (k, _) = kd(&calculate_stochastic(&bars, 2, 1, 1), 1);
        assert!(k.abs() < f64::EPSILON);
    }

    #[test]
    fn stochastic_smoothing_warmup() {
        let hlc: Vec<(f64, f64, f64)> = (0..10)
            .map(|i| {
                let c = 100.0 + (i % 3) as f64;
                (c + 1.0, c - 1.0, c)
            })
            .collect();
        let series = calculate_stochastic(&bars_from_hlc(&hlc), 3, 2, 2);

        // raw %K from index 2, %K from 3, %D from 4
        for i in 0..4 {
            assert!(!series.values[i].is_defined(), "index {}", i);
        }
        assert!(series.values[4].is_defined());
    }

    #[test]
    fn stochastic_d_is_mean_of_k() {
        let hlc = [
            (10.0, 0.0, 5.0),
            (10.0, 0.0, 10.0),
            (10.0, 0.0, 0.0),
            (10.0, 0.0, 5.0),
        ];
        let series = calculate_stochastic(&bars_from_hlc(&hlc), 1, 1, 2);
        let (k, d) = kd(&series, 2);
        assert!((k - 0.0).abs() < f64::EPSILON);
        assert!((d - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stochastic_flat_window_undefined() {
        let bars = bars_from_hlc(&[(100.0, 100.0, 100.0); 6]);
        let series = calculate_stochastic(&bars, 3, 1, 1);
        assert_eq!(series.defined_count(), 0);
    }

    #[test]
    fn stochastic_values_in_range() {
        let hlc: Vec<(f64, f64, f64)> = (0..40)
            .map(|i| {
                let c = 50.0 + ((i * 5) % 13) as f64;
                (c + 2.0, c - 2.0, c)
            })
            .collect();
        let series = calculate_stochastic(&bars_from_hlc(&hlc), 14, 3, 3);

        for point in &series.values {
            if let Some(IndicatorValue::Stochastic { k, d }) = point.value {
                assert!((0.0..=100.0).contains(&k));
                assert!((0.0..=100.0).contains(&d));
            }
        }
        assert!(series.defined_count() > 0);
    }

    #[test]
    fn stochastic_zero_period() {
        let bars = bars_from_hlc(&[(10.0, 5.0, 7.0); 3]);
        assert_eq!(calculate_stochastic(&bars, 0, 3, 3).defined_count(), 0);
    }
}
