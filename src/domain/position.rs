//! Position state and closed trades.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The single-instrument position: either out of the market or long a whole
/// number of units.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long {
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
        quantity: u64,
    },
}

impl PositionState {
    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long { .. })
    }

    pub fn quantity(&self) -> u64 {
        match self {
            PositionState::Flat => 0,
            PositionState::Long { quantity, .. } => *quantity,
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity() as f64 * price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
}

/// A completed long round trip. `pnl` is net of commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDateTime,
    pub entry_price: f64,
    pub exit_date: NaiveDateTime,
    pub exit_price: f64,
    pub quantity: u64,
    pub side: TradeSide,
    pub pnl: f64,
    pub pnl_percent: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }
}
