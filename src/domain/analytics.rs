//! Extended risk and trade analytics reported alongside [`Metrics`].
//!
//! [`Metrics`]: super::metrics::Metrics

use serde::Serialize;

use super::metrics::{
    drawdown_series, mean, per_bar_returns, population_stddev, TRADING_DAYS_PER_YEAR,
};
use super::position::Trade;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub value_at_risk_95: f64,
    pub conditional_value_at_risk_95: f64,
    pub max_consecutive_losses: usize,
    pub average_win: f64,
    /// Mean of losing trade pnls, <= 0.
    pub average_loss: f64,
    pub expectancy: f64,
    pub payoff_ratio: f64,
    pub recovery_factor: f64,
}

impl Analytics {
    pub fn compute(
        equity_curve: &[f64],
        trades: &[Trade],
        initial_capital: f64,
        risk_free_rate: f64,
    ) -> Self {
        let returns = per_bar_returns(equity_curve);
        let total_return = equity_curve.last().copied().unwrap_or(initial_capital) - initial_capital;
        let var = value_at_risk(&returns, 0.95);

        Analytics {
            sortino_ratio: sortino_ratio(&returns, risk_free_rate),
            calmar_ratio: calmar_ratio(&returns, equity_curve),
            value_at_risk_95: var,
            conditional_value_at_risk_95: conditional_value_at_risk(&returns, var),
            max_consecutive_losses: max_consecutive_losses(trades),
            average_win: average_win(trades),
            average_loss: average_loss(trades),
            expectancy: expectancy(trades),
            payoff_ratio: payoff_ratio(trades),
            recovery_factor: recovery_factor(total_return, equity_curve),
        }
    }
}

/// Mean excess return over the dispersion of the below-zero part of excess
/// returns, annualized. 0 when there is no downside dispersion.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let downside: Vec<f64> = excess.iter().map(|e| e.min(0.0)).collect();
    let downside_std = population_stddev(&downside);
    if downside_std <= f64::EPSILON {
        return 0.0;
    }
    mean(&excess) / downside_std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized mean return over the magnitude of the worst drawdown fraction.
pub fn calmar_ratio(returns: &[f64], equity_curve: &[f64]) -> f64 {
    let max_dd = drawdown_series(equity_curve)
        .into_iter()
        .fold(0.0_f64, f64::min);
    if max_dd.abs() < EPSILON {
        return 0.0;
    }
    mean(returns) * TRADING_DAYS_PER_YEAR / max_dd.abs()
}

/// Return at the (1 - confidence) percentile, linearly interpolated between
/// order statistics. 0 for an empty series.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (1.0 - confidence) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Mean of the returns at or below `var`.
pub fn conditional_value_at_risk(returns: &[f64], var: f64) -> f64 {
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    mean(&tail)
}

pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    let mut max_run = 0;
    let mut run = 0;
    for trade in trades {
        if trade.is_loss() {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 0;
        }
    }
    max_run
}

pub fn average_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl).collect();
    mean(&wins)
}

pub fn average_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades.iter().filter(|t| t.is_loss()).map(|t| t.pnl).collect();
    mean(&losses)
}

/// win_prob * average_win + (1 - win_prob) * average_loss
pub fn expectancy(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let win_prob = wins as f64 / trades.len() as f64;
    win_prob * average_win(trades) + (1.0 - win_prob) * average_loss(trades)
}

pub fn payoff_ratio(trades: &[Trade]) -> f64 {
    let avg_loss = average_loss(trades).abs();
    if avg_loss < EPSILON {
        return 0.0;
    }
    average_win(trades) / avg_loss
}

/// Total return over the largest peak-to-trough drop in currency.
pub fn recovery_factor(total_return: f64, equity_curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_drop = 0.0_f64;
    for &equity in equity_curve {
        peak = peak.max(equity);
        max_drop = max_drop.max(peak - equity);
    }
    if max_drop < EPSILON {
        return 0.0;
    }
    total_return / max_drop
}
