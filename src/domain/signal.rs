//! Trading signals: one of sell, hold or buy per bar.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::AlgolabError;
use super::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl Signal {
    pub fn value(self) -> i64 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }

    /// Positive states buy, negative states sell, zero holds.
    pub(crate) fn from_sign(state: i8) -> Signal {
        match state.signum() {
            1 => Signal::Buy,
            -1 => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}

impl From<Signal> for i64 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

impl TryFrom<i64> for Signal {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Sell),
            0 => Ok(Signal::Hold),
            1 => Ok(Signal::Buy),
            other => Err(format!("{other} is not one of -1, 0, 1")),
        }
    }
}

/// A signal per bar, aligned 1:1 with the price series it was generated from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalSeries(Vec<Signal>);

impl SignalSeries {
    pub fn new(signals: Vec<Signal>) -> Self {
        SignalSeries(signals)
    }

    /// Validate externally supplied integer signals. Values outside
    /// {-1, 0, 1} are rejected with their index; nothing is clamped.
    pub fn from_raw(raw: &[i64]) -> Result<Self, AlgolabError> {
        raw.iter()
            .enumerate()
            .map(|(index, &value)| {
                Signal::try_from(value).map_err(|_| AlgolabError::InvalidSignal { index, value })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SignalSeries)
    }

    /// Turn a per-bar state (+1 / 0 / -1) into edge-triggered signals: a bar
    /// carries the state only when it differs from the previous bar's state.
    pub(crate) fn from_state_changes(states: &[i8]) -> Self {
        let signals = states
            .iter()
            .enumerate()
            .map(|(i, &state)| {
                if i == 0 || state != states[i - 1] {
                    Signal::from_sign(state)
                } else {
                    Signal::Hold
                }
            })
            .collect();
        SignalSeries(signals)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Signal> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Signal> + '_ {
        self.0.iter().copied()
    }

    pub fn to_raw(&self) -> Vec<i64> {
        self.iter().map(Signal::value).collect()
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.iter().filter(|s| *s == signal).count()
    }

    /// Reject a series that does not line up with the bars.
    pub fn ensure_len(&self, bars: usize) -> Result<(), AlgolabError> {
        if self.len() != bars {
            return Err(AlgolabError::LengthMismatch {
                bars,
                signals: self.len(),
            });
        }
        Ok(())
    }
}

/// Raw signals from an external source, before they are lined up with bars.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalSignals {
    /// One value per bar, in bar order.
    Positional(Vec<i64>),
    /// Values keyed by bar timestamp. Rows outside the bars are ignored.
    Dated(Vec<(NaiveDateTime, i64)>),
}

impl ExternalSignals {
    /// Validate every value, then produce one signal per bar.
    ///
    /// Positional input must match the bar count exactly. Dated input must
    /// cover every bar timestamp once; a bar without a row is a data error.
    pub fn align(&self, bars: &[PriceBar]) -> Result<SignalSeries, AlgolabError> {
        match self {
            ExternalSignals::Positional(values) => {
                let series = SignalSeries::from_raw(values)?;
                series.ensure_len(bars.len())?;
                Ok(series)
            }
            ExternalSignals::Dated(rows) => {
                let values: Vec<i64> = rows.iter().map(|&(_, value)| value).collect();
                let validated = SignalSeries::from_raw(&values)?;

                let mut by_timestamp = HashMap::with_capacity(rows.len());
                for (&(timestamp, _), signal) in rows.iter().zip(validated.iter()) {
                    if by_timestamp.insert(timestamp, signal).is_some() {
                        return Err(AlgolabError::Data {
                            reason: format!("duplicate signal for {timestamp}"),
                        });
                    }
                }

                bars.iter()
                    .enumerate()
                    .map(|(index, bar)| {
                        by_timestamp.get(&bar.timestamp).copied().ok_or_else(|| {
                            AlgolabError::Data {
                                reason: format!("no signal for bar {index} at {}", bar.timestamp),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(SignalSeries)
            }
        }
    }
}
