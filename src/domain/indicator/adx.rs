//! ADX (Average Directional Index) indicator.
//!
//! +DM = high - prev_high when that move exceeds prev_low - low and is positive, else 0
//! -DM = prev_low - low when that move exceeds high - prev_high and is positive, else 0
//! +DI = 100 × mean(+DM) / ATR,  -DI = 100 × mean(-DM) / ATR
//! DX  = 100 × |+DI - -DI| / (+DI + -DI)
//! ADX = rolling mean of DX over n bars
//!
//! All means are simple rolling means over n bars. DI is undefined where ATR
//! is 0 and DX is undefined where the DI sum is 0, so a flat series never
//! produces an ADX value.

use crate::domain::indicator::atr::true_ranges;
use crate::domain::indicator::{rolling_mean, rolling_mean_defined, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_adx(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let (plus_dm, minus_dm) = directional_movement(bars);
    let atr = rolling_mean(&true_ranges(bars), period);
    let plus_avg = rolling_mean(&plus_dm, period);
    let minus_avg = rolling_mean(&minus_dm, period);

    let dx: Vec<Option<f64>> = (0..bars.len())
        .map(|i| {
            let atr = atr[i].filter(|a| *a != 0.0)?;
            let plus_di = 100.0 * plus_avg[i]? / atr;
            let minus_di = 100.0 * minus_avg[i]? / atr;
            let sum = plus_di + minus_di;
            if sum == 0.0 {
                None
            } else {
                Some(100.0 * (plus_di - minus_di).abs() / sum)
            }
        })
        .collect();

    IndicatorSeries::from_simple(
        IndicatorType::Adx(period),
        bars,
        rolling_mean_defined(&dx, period),
    )
}

fn directional_movement(bars: &[PriceBar]) -> (Vec<f64>, Vec<f64>) {
    let mut plus = Vec::with_capacity(bars.len());
    let mut minus = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            plus.push(0.0);
            minus.push(0.0);
            continue;
        }
        let up = bar.high - bars[i - 1].high;
        let down = bars[i - 1].low - bar.low;
        plus.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus.push(if down > up && down > 0.0 { down } else { 0.0 });
    }

    (plus, minus)
}
