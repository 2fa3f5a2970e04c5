//! Trade execution and fill simulation.
//!
//! Walks the bars once, applying each bar's signal to a single long-only
//! position. Fills happen at the bar close adjusted for slippage; positions
//! are sized to deploy all available cash in whole units.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::AlgolabError;
use super::ohlcv::PriceBar;
use super::position::{PositionState, Trade, TradeSide};
use super::signal::{Signal, SignalSeries};

/// How the proceeds of a closing sale are credited back to cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    /// `cash += quantity * exit_price + net_pnl`: the notional is returned and
    /// the net pnl is credited a second time on top of it.
    #[default]
    Legacy,
    /// `cash += quantity * exit_price - commission`: the sum of trade pnls
    /// equals the change in equity.
    Notional,
}

impl fmt::Display for SettlementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementMode::Legacy => write!(f, "legacy"),
            SettlementMode::Notional => write!(f, "notional"),
        }
    }
}

impl FromStr for SettlementMode {
    type Err = AlgolabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(SettlementMode::Legacy),
            "notional" => Ok(SettlementMode::Notional),
            other => Err(AlgolabError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "settlement".to_string(),
                reason: format!("expected legacy or notional, got {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    /// Fraction of traded notional charged on each side of a round trip.
    pub commission_rate: f64,
    /// Fractional adverse price offset applied to every fill.
    pub slippage_rate: f64,
    pub settlement: SettlementMode,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_rate: 0.001,
            slippage_rate: 0.0,
            settlement: SettlementMode::Legacy,
        }
    }
}

/// Long entry (buy): execution_price = market_price * (1 + slippage_rate)
pub fn apply_slippage_entry(market_price: f64, slippage_rate: f64) -> f64 {
    market_price * (1.0 + slippage_rate)
}

/// Long exit (sell): execution_price = market_price * (1 - slippage_rate)
pub fn apply_slippage_exit(market_price: f64, slippage_rate: f64) -> f64 {
    market_price * (1.0 - slippage_rate)
}

/// Round-trip commission: (entry notional + exit notional) * rate.
pub fn calculate_commission(entry_value: f64, exit_value: f64, commission_rate: f64) -> f64 {
    (entry_value + exit_value) * commission_rate
}

/// Whole units affordable at `price`, never exceeding `cash`.
pub fn affordable_quantity(cash: f64, price: f64) -> u64 {
    if cash <= 0.0 || price <= 0.0 {
        return 0;
    }
    let mut quantity = (cash / price).floor() as u64;
    if quantity > 0 && quantity as f64 * price > cash {
        quantity -= 1;
    }
    quantity
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        quantity: u64,
        execution_price: f64,
        cost: f64,
    },
    InsufficientCapital,
}

/// Open a long position with all available cash.
///
/// 1. Apply entry slippage to the close
/// 2. Size to whole units of available cash
/// 3. If no unit is affordable, stay flat
/// 4. Deduct the notional from cash
pub fn enter_long(
    cash: &mut f64,
    position: &mut PositionState,
    market_price: f64,
    timestamp: NaiveDateTime,
    config: &ExecutionConfig,
) -> EntryResult {
    let execution_price = apply_slippage_entry(market_price, config.slippage_rate);
    let quantity = affordable_quantity(*cash, execution_price);

    if quantity == 0 {
        return EntryResult::InsufficientCapital;
    }

    let cost = quantity as f64 * execution_price;
    *cash -= cost;
    *position = PositionState::Long {
        entry_price: execution_price,
        entry_timestamp: timestamp,
        quantity,
    };

    EntryResult::Entered {
        quantity,
        execution_price,
        cost,
    }
}

/// Close the open long position, settle cash and return the trade.
/// Returns `None` when flat.
pub fn exit_long(
    cash: &mut f64,
    position: &mut PositionState,
    market_price: f64,
    timestamp: NaiveDateTime,
    config: &ExecutionConfig,
) -> Option<Trade> {
    let PositionState::Long {
        entry_price,
        entry_timestamp,
        quantity,
    } = std::mem::take(position)
    else {
        return None;
    };

    let exit_price = apply_slippage_exit(market_price, config.slippage_rate);
    let qty = quantity as f64;
    let entry_value = qty * entry_price;
    let exit_value = qty * exit_price;

    let gross_pnl = (exit_price - entry_price) * qty;
    let commission = calculate_commission(entry_value, exit_value, config.commission_rate);
    let net_pnl = gross_pnl - commission;

    match config.settlement {
        SettlementMode::Legacy => *cash += exit_value + net_pnl,
        SettlementMode::Notional => *cash += exit_value - commission,
    }

    let pnl_percent = if entry_value > 0.0 {
        net_pnl / entry_value * 100.0
    } else {
        0.0
    };

    Some(Trade {
        entry_date: entry_timestamp,
        entry_price,
        exit_date: timestamp,
        exit_price,
        quantity,
        side: TradeSide::Buy,
        pnl: net_pnl,
        pnl_percent,
    })
}

/// Trades and one equity value per bar from a single simulation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationOutput {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
}

/// Replay `signals` over `bars`.
///
/// Buy while flat enters, sell while long exits, everything else is a no-op.
/// Equity is cash plus the open position marked at the close; the first
/// entry is always `initial_capital`. A position still open after the last
/// bar is closed at that bar's close and the last equity value becomes the
/// settled cash.
///
/// The caller is responsible for validating the bars and for the signal
/// series having the same length as the bars.
pub fn simulate(
    bars: &[PriceBar],
    signals: &SignalSeries,
    initial_capital: f64,
    config: &ExecutionConfig,
) -> SimulationOutput {
    let mut cash = initial_capital;
    let mut position = PositionState::Flat;
    let mut trades = Vec::new();
    let mut equity_curve = Vec::with_capacity(bars.len());

    for (i, (bar, signal)) in bars.iter().zip(signals.iter()).enumerate() {
        match (signal, position.is_long()) {
            (Signal::Buy, false) => {
                match enter_long(&mut cash, &mut position, bar.close, bar.timestamp, config) {
                    EntryResult::Entered {
                        quantity,
                        execution_price,
                        ..
                    } => debug!(bar = i, quantity, price = execution_price, "entered long"),
                    EntryResult::InsufficientCapital => {
                        debug!(bar = i, cash, "buy skipped, insufficient capital")
                    }
                }
            }
            (Signal::Sell, true) => {
                if let Some(trade) =
                    exit_long(&mut cash, &mut position, bar.close, bar.timestamp, config)
                {
                    debug!(bar = i, price = trade.exit_price, pnl = trade.pnl, "exited long");
                    trades.push(trade);
                }
            }
            _ => {}
        }

        equity_curve.push(cash + position.market_value(bar.close));
    }

    if let Some(last) = bars.last() {
        if let Some(trade) = exit_long(&mut cash, &mut position, last.close, last.timestamp, config)
        {
            debug!(pnl = trade.pnl, "closed open position at final bar");
            trades.push(trade);
            if let Some(final_equity) = equity_curve.last_mut() {
                *final_equity = cash;
            }
        }
    }

    if let Some(first) = equity_curve.first_mut() {
        *first = initial_capital;
    }

    SimulationOutput {
        trades,
        equity_curve,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::bars_from_closes;
    use approx::assert_relative_eq;

    fn zero_cost(settlement: SettlementMode) -> ExecutionConfig {
        ExecutionConfig {
            commission_rate: 0.0,
            slippage_rate: 0.0,
            settlement,
        }
    }

    fn signals(raw: &[i64]) -> SignalSeries {
        SignalSeries::from_raw(raw).unwrap()
    }

    #[test]
    fn slippage_entry_and_exit() {
        assert_relative_eq!(apply_slippage_entry(100.0, 0.01), 101.0);
        assert_relative_eq!(apply_slippage_exit(100.0, 0.01), 99.0);
    }

    #[test]
    fn commission_round_trip() {
        let c = calculate_commission(10000.0, 11000.0, 0.001);
        assert_relative_eq!(c, 21.0);
    }

    #[test]
    fn affordable_quantity_floors() {
        assert_eq!(affordable_quantity(10000.0, 100.0), 100);
        assert_eq!(affordable_quantity(10000.0, 101.0), 99);
        assert_eq!(affordable_quantity(50.0, 100.0), 0);
        assert_eq!(affordable_quantity(-10.0, 100.0), 0);
    }

    #[test]
    fn settlement_mode_parse() {
        assert_eq!("legacy".parse::<SettlementMode>().unwrap(), SettlementMode::Legacy);
        assert_eq!("Notional".parse::<SettlementMode>().unwrap(), SettlementMode::Notional);
        assert!("gross".parse::<SettlementMode>().is_err());
    }

    #[test]
    fn enter_long_insufficient_capital_stays_flat() {
        let bars = bars_from_closes(&[100.0]);
        let mut cash = 50.0;
        let mut position = PositionState::Flat;
        let result = enter_long(
            &mut cash,
            &mut position,
            100.0,
            bars[0].timestamp,
            &ExecutionConfig::default(),
        );
        assert_eq!(result, EntryResult::InsufficientCapital);
        assert_eq!(position, PositionState::Flat);
        assert_eq!(cash, 50.0);
    }

    #[test]
    fn exit_long_when_flat_is_none() {
        let bars = bars_from_closes(&[100.0]);
        let mut cash = 100.0;
        let mut position = PositionState::Flat;
        let trade = exit_long(
            &mut cash,
            &mut position,
            100.0,
            bars[0].timestamp,
            &ExecutionConfig::default(),
        );
        assert!(trade.is_none());
        assert_eq!(cash, 100.0);
    }

    #[test]
    fn legacy_round_trip_double_credits_pnl() {
        let bars = bars_from_closes(&[100.0, 110.0]);
        let out = simulate(&bars, &signals(&[1, -1]), 10000.0, &zero_cost(SettlementMode::Legacy));

        assert_eq!(out.trades.len(), 1);
        let trade = &out.trades[0];
        assert_eq!(trade.quantity, 100);
        assert_relative_eq!(trade.pnl, 1000.0);
        assert_relative_eq!(trade.pnl_percent, 10.0);
        assert_eq!(out.equity_curve, vec![10000.0, 12000.0]);
    }

    #[test]
    fn notional_round_trip_credits_proceeds() {
        let bars = bars_from_closes(&[100.0, 110.0]);
        let out = simulate(
            &bars,
            &signals(&[1, -1]),
            10000.0,
            &zero_cost(SettlementMode::Notional),
        );
        assert_eq!(out.equity_curve, vec![10000.0, 11000.0]);
    }

    #[test]
    fn commission_and_slippage_applied() {
        let bars = bars_from_closes(&[100.0, 100.0]);
        let config = ExecutionConfig {
            commission_rate: 0.001,
            slippage_rate: 0.01,
            settlement: SettlementMode::Notional,
        };
        let out = simulate(&bars, &signals(&[1, -1]), 10000.0, &config);
        let trade = &out.trades[0];

        assert_relative_eq!(trade.entry_price, 101.0);
        assert_relative_eq!(trade.exit_price, 99.0);
        assert_eq!(trade.quantity, 99);
        let commission = (99.0 * 101.0 + 99.0 * 99.0) * 0.001;
        assert_relative_eq!(trade.pnl, -2.0 * 99.0 - commission, epsilon = 1e-9);
    }

    #[test]
    fn notional_full_slippage_with_commission_goes_negative() {
        // Entry commission is not reserved when sizing, so a sale at zero
        // still owes it.
        let bars = bars_from_closes(&[100.0, 100.0]);
        let config = ExecutionConfig {
            commission_rate: 0.001,
            slippage_rate: 1.0,
            settlement: SettlementMode::Notional,
        };
        let out = simulate(&bars, &signals(&[1, -1]), 10000.0, &config);
        assert_eq!(out.trades[0].quantity, 50);
        assert_relative_eq!(out.equity_curve[1], -10.0, epsilon = 1e-9);
    }

    #[test]
    fn notional_full_slippage_without_commission_floors_at_zero() {
        let bars = bars_from_closes(&[100.0, 100.0]);
        let config = ExecutionConfig {
            slippage_rate: 1.0,
            ..zero_cost(SettlementMode::Notional)
        };
        let out = simulate(&bars, &signals(&[1, -1]), 10000.0, &config);
        assert_relative_eq!(out.equity_curve[1], 0.0);
    }

    #[test]
    fn equity_marks_open_position_to_market() {
        let bars = bars_from_closes(&[100.0, 105.0, 95.0, 100.0]);
        let out = simulate(
            &bars,
            &signals(&[1, 0, 0, 0]),
            10000.0,
            &zero_cost(SettlementMode::Notional),
        );
        assert_eq!(out.equity_curve[1], 10500.0);
        assert_eq!(out.equity_curve[2], 9500.0);
    }

    #[test]
    fn open_position_force_closed_at_end() {
        let bars = bars_from_closes(&[100.0, 110.0, 120.0]);
        let out = simulate(
            &bars,
            &signals(&[1, 0, 0]),
            10000.0,
            &zero_cost(SettlementMode::Legacy),
        );
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].exit_date, bars[2].timestamp);
        // cash = 12000 + 2000 under legacy settlement
        assert_eq!(out.equity_curve[2], 14000.0);
    }

    #[test]
    fn repeated_buy_and_sell_when_flat_are_no_ops() {
        let bars = bars_from_closes(&[100.0, 100.0, 100.0, 100.0, 100.0]);
        let out = simulate(
            &bars,
            &signals(&[-1, 1, 1, -1, -1]),
            10000.0,
            &zero_cost(SettlementMode::Notional),
        );
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].entry_date, bars[1].timestamp);
        assert_eq!(out.trades[0].exit_date, bars[3].timestamp);
    }

    #[test]
    fn first_equity_pinned_even_when_buying() {
        let bars = bars_from_closes(&[100.0, 100.0]);
        let config = ExecutionConfig {
            slippage_rate: 0.05,
            ..zero_cost(SettlementMode::Legacy)
        };
        let out = simulate(&bars, &signals(&[1, 0]), 10000.0, &config);
        assert_eq!(out.equity_curve[0], 10000.0);
    }

    #[test]
    fn single_bar_buy_still_emits_trade() {
        let bars = bars_from_closes(&[100.0]);
        let out = simulate(&bars, &signals(&[1]), 10000.0, &ExecutionConfig::default());
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.equity_curve, vec![10000.0]);
    }

    #[test]
    fn equity_curve_len_matches_bars() {
        let bars = bars_from_closes(&[100.0; 7]);
        let out = simulate(&bars, &signals(&[0; 7]), 5000.0, &ExecutionConfig::default());
        assert_eq!(out.equity_curve.len(), 7);
        assert!(out.equity_curve.iter().all(|&e| e == 5000.0));
    }
}
