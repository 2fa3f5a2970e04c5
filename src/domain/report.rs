//! Serializable report assembled from one or more backtest runs.

use serde::Serialize;

use super::analytics::Analytics;
use super::backtest::{BacktestConfig, BacktestResult};
use super::metrics::MetricsDifference;

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub symbol: Option<String>,
    pub config: BacktestConfig,
    pub runs: Vec<RunReport>,
}

/// One run plus its derived analytics. `difference_from_baseline` is set
/// for every run after the first.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub result: BacktestResult,
    pub analytics: Analytics,
    pub difference_from_baseline: Option<MetricsDifference>,
}

impl BacktestReport {
    pub fn new(symbol: Option<String>, config: BacktestConfig, results: Vec<BacktestResult>) -> Self {
        let baseline = results.first().map(|r| r.metrics.clone());

        let runs = results
            .into_iter()
            .enumerate()
            .map(|(i, result)| {
                let analytics = Analytics::compute(
                    &result.equity_curve,
                    &result.trades,
                    config.initial_capital,
                    config.risk_free_rate,
                );
                let difference_from_baseline = match (&baseline, i) {
                    (Some(base), i) if i > 0 => Some(result.metrics.difference(base)),
                    _ => None,
                };
                RunReport {
                    result,
                    analytics,
                    difference_from_baseline,
                }
            })
            .collect();

        BacktestReport {
            symbol,
            config,
            runs,
        }
    }

    pub fn baseline(&self) -> Option<&RunReport> {
        self.runs.first()
    }
}
