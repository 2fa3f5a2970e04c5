//! Performance metrics and statistics.
//!
//! Everything here is a pure reduction over an equity curve and a trade
//! list. Degenerate inputs (no trades, flat equity, zero losses) resolve to
//! fixed fallback values rather than errors or NaN.

use serde::Serialize;

use super::position::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Below this, a total profit or loss is treated as zero.
const PNL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_return: f64,
    /// Percent of initial capital.
    pub roi: f64,
    pub sharpe_ratio: f64,
    /// Percent, always <= 0.
    pub max_drawdown: f64,
    /// Percent of closed trades with positive pnl.
    pub win_rate: f64,
    /// Serialized as `null` when infinite.
    pub profit_factor: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub average_trade: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
}

/// Per-metric change of one run against a baseline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsDifference {
    pub total_return: f64,
    pub roi: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_trades: i64,
    pub average_trade: f64,
}

impl Metrics {
    pub fn compute(
        equity_curve: &[f64],
        trades: &[Trade],
        initial_capital: f64,
        risk_free_rate: f64,
    ) -> Self {
        let final_equity = equity_curve.last().copied().unwrap_or(initial_capital);
        let total_return = final_equity - initial_capital;
        let roi = if initial_capital > 0.0 {
            total_return / initial_capital * 100.0
        } else {
            0.0
        };

        let returns = per_bar_returns(equity_curve);
        let sharpe_ratio = sharpe_ratio(&returns, risk_free_rate);
        let max_drawdown = max_drawdown(equity_curve);

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_profit = 0.0_f64;
        let mut total_loss = 0.0_f64;
        let mut best_trade = f64::NEG_INFINITY;
        let mut worst_trade = f64::INFINITY;
        let mut pnl_sum = 0.0_f64;

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                winning_trades += 1;
                total_profit += pnl;
            } else if pnl < 0.0 {
                losing_trades += 1;
                total_loss += pnl.abs();
            }
            best_trade = best_trade.max(pnl);
            worst_trade = worst_trade.min(pnl);
            pnl_sum += pnl;
        }

        let total_trades = trades.len();
        let (win_rate, average_trade) = if total_trades > 0 {
            (
                winning_trades as f64 / total_trades as f64 * 100.0,
                pnl_sum / total_trades as f64,
            )
        } else {
            best_trade = 0.0;
            worst_trade = 0.0;
            (0.0, 0.0)
        };

        Metrics {
            total_return,
            roi,
            sharpe_ratio,
            max_drawdown,
            win_rate,
            profit_factor: profit_factor(total_profit, total_loss),
            total_trades,
            winning_trades,
            losing_trades,
            average_trade,
            best_trade,
            worst_trade,
        }
    }

    /// `self - baseline` for each comparable metric.
    pub fn difference(&self, baseline: &Metrics) -> MetricsDifference {
        MetricsDifference {
            total_return: self.total_return - baseline.total_return,
            roi: self.roi - baseline.roi,
            sharpe_ratio: self.sharpe_ratio - baseline.sharpe_ratio,
            max_drawdown: self.max_drawdown - baseline.max_drawdown,
            win_rate: self.win_rate - baseline.win_rate,
            profit_factor: self.profit_factor - baseline.profit_factor,
            total_trades: self.total_trades as i64 - baseline.total_trades as i64,
            average_trade: self.average_trade - baseline.average_trade,
        }
    }
}

/// (equity[i] - equity[i-1]) / equity[i-1] for i >= 1. A non-positive
/// previous value yields a 0 return.
pub fn per_bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0];
            let curr = w[1];
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N).
pub(crate) fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Annualized Sharpe ratio of per-bar returns, 0 when there are no returns
/// or they have no dispersion.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.is_empty() || population_stddev(returns) <= f64::EPSILON {
        return 0.0;
    }
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let stddev = population_stddev(&excess);
    if stddev <= f64::EPSILON {
        return 0.0;
    }
    mean(&excess) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Drawdown from the running peak at every bar, as a fraction (<= 0).
pub fn drawdown_series(equity_curve: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity_curve
        .iter()
        .map(|&equity| {
            peak = peak.max(equity);
            if peak > 0.0 {
                (equity - peak) / peak
            } else {
                0.0
            }
        })
        .collect()
}

/// Largest peak-to-trough decline, in percent (<= 0, 0 for a
/// non-decreasing curve).
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    drawdown_series(equity_curve)
        .into_iter()
        .fold(0.0_f64, f64::min)
        * 100.0
}

/// Total profit over total absolute loss. No losses gives +inf when there
/// was any profit and 0 otherwise.
pub fn profit_factor(total_profit: f64, total_loss: f64) -> f64 {
    if total_loss < PNL_EPSILON {
        if total_profit < PNL_EPSILON {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        total_profit / total_loss
    }
}
