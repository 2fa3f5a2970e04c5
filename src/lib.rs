//! algolab: deterministic single-asset strategy backtester.
//!
//! Hexagonal layout: pure simulation core in [`domain`], I/O traits in
//! [`ports`], CSV/INI/JSON implementations in [`adapters`], and the command
//! line front end in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
