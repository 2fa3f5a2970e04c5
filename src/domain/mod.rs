//! Simulation core: price data, indicators, strategies, execution and
//! performance statistics. No I/O beyond tracing diagnostics.

pub mod analytics;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod report;
pub mod signal;
pub mod strategy;
