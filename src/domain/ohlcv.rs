//! OHLCV price bar representation and series validation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::AlgolabError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Check the input contract for a price series: non-empty, strictly
/// increasing timestamps, finite fields, positive closes.
pub fn validate_bars(bars: &[PriceBar]) -> Result<(), AlgolabError> {
    if bars.is_empty() {
        return Err(AlgolabError::EmptySeries);
    }

    for (index, bar) in bars.iter().enumerate() {
        let fields = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
            ("volume", bar.volume),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AlgolabError::InvalidPrice {
                index,
                reason: format!("{name} is not a finite number"),
            });
        }
        if bar.close <= 0.0 {
            return Err(AlgolabError::InvalidPrice {
                index,
                reason: format!("close must be positive, got {}", bar.close),
            });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(AlgolabError::NonMonotonicTimestamp { index });
        }
    }

    Ok(())
}

/// Closing prices in series order.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
