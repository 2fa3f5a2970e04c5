//! Run configuration loading and validation.
//!
//! Everything here runs before any price data is touched, so a bad config
//! fails fast with the offending section and key.

use std::path::PathBuf;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::AlgolabError;
use crate::domain::execution::SettlementMode;
use crate::domain::strategy::{Strategy, StrategyKind, StrategyParams};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const BACKTEST: &str = "backtest";
const DATA: &str = "data";
const STRATEGY: &str = "strategy";

/// A fully validated run: where the data lives and how to simulate it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub symbol: String,
    pub csv_dir: PathBuf,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub backtest: BacktestConfig,
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, AlgolabError> {
    let defaults = BacktestConfig::default();
    let settlement = match config.get_string(BACKTEST, "settlement") {
        Some(raw) => raw.parse::<SettlementMode>()?,
        None => defaults.settlement,
    };

    let backtest = BacktestConfig {
        initial_capital: config.get_double(BACKTEST, "initial_capital", defaults.initial_capital)?,
        commission_rate: config.get_double(BACKTEST, "commission_rate", defaults.commission_rate)?,
        slippage_rate: config.get_double(BACKTEST, "slippage_rate", defaults.slippage_rate)?,
        risk_free_rate: config.get_double(BACKTEST, "risk_free_rate", defaults.risk_free_rate)?,
        settlement,
    };
    backtest.validate()?;
    Ok(backtest)
}

/// Optional `[backtest] start_date` / `end_date`. When both are present the
/// start must come strictly before the end.
pub fn load_date_range(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), AlgolabError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;

    if matches!((start, end), (Some(s), Some(e)) if s >= e) {
        return Err(AlgolabError::ConfigInvalid {
            section: BACKTEST.to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok((start, end))
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<Option<NaiveDate>, AlgolabError> {
    config
        .get_string(BACKTEST, field)
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| AlgolabError::ConfigInvalid {
                section: BACKTEST.to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            })
        })
        .transpose()
}

/// Build the strategy described by the `[strategy]` section. Only the
/// parameters the chosen kind recognizes are read.
pub fn load_strategy(config: &dyn ConfigPort) -> Result<Strategy, AlgolabError> {
    let kind: StrategyKind = config
        .get_string(STRATEGY, "kind")
        .ok_or_else(|| AlgolabError::ConfigMissing {
            section: STRATEGY.to_string(),
            key: "kind".to_string(),
        })?
        .parse()?;

    let params = kind
        .default_params()
        .iter()
        .map(|(key, default)| Ok((key.to_string(), config.get_double(STRATEGY, key, default)?)))
        .collect::<Result<StrategyParams, AlgolabError>>()?;

    let strategy = Strategy::build(kind, &params)?;
    Ok(match config.get_string(STRATEGY, "name") {
        Some(name) => strategy.with_name(name),
        None => strategy,
    })
}

pub fn has_strategy(config: &dyn ConfigPort) -> bool {
    config.get_string(STRATEGY, "kind").is_some()
}

/// Validate everything needed to run a backtest. `symbol_override` takes
/// precedence over `[backtest] symbol`.
pub fn load_run_config(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<RunConfig, AlgolabError> {
    let backtest = load_backtest_config(config)?;
    let (start_date, end_date) = load_date_range(config)?;

    let symbol = match symbol_override {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => required(config, BACKTEST, "symbol")?,
    };
    let csv_dir = load_csv_dir(config)?;

    Ok(RunConfig {
        symbol,
        csv_dir,
        start_date,
        end_date,
        backtest,
    })
}

/// `[data] csv_dir`, the directory holding one CSV file per symbol.
pub fn load_csv_dir(config: &dyn ConfigPort) -> Result<PathBuf, AlgolabError> {
    required(config, DATA, "csv_dir").map(PathBuf::from)
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, AlgolabError> {
    config
        .get_string(section, key)
        .ok_or_else(|| AlgolabError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::strategy::SignalGenerator;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const VALID: &str = r#"
[backtest]
initial_capital = 50000.0
commission_rate = 0.002
slippage_rate = 0.0005
risk_free_rate = 0.03
settlement = notional
symbol = BHP
start_date = 2020-01-01
end_date = 2024-12-31

[data]
csv_dir = ./data
"#;

    #[test]
    fn valid_run_config_passes() {
        let run = load_run_config(&make_config(VALID), None).unwrap();
        assert_eq!(run.symbol, "BHP");
        assert_eq!(run.csv_dir, PathBuf::from("./data"));
        assert_eq!(run.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(run.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(run.backtest.initial_capital, 50000.0);
        assert_eq!(run.backtest.commission_rate, 0.002);
        assert_eq!(run.backtest.slippage_rate, 0.0005);
        assert_eq!(run.backtest.risk_free_rate, 0.03);
        assert_eq!(run.backtest.settlement, SettlementMode::Notional);
    }

    #[test]
    fn empty_backtest_section_uses_defaults() {
        let backtest = load_backtest_config(&make_config("[backtest]\n")).unwrap();
        assert_eq!(backtest, BacktestConfig::default());
    }

    #[test]
    fn symbol_override_wins() {
        let run = load_run_config(&make_config(VALID), Some("CBA")).unwrap();
        assert_eq!(run.symbol, "CBA");

        let run = load_run_config(&make_config("[data]\ncsv_dir = x\n"), Some("CBA")).unwrap();
        assert_eq!(run.symbol, "CBA");
    }

    #[test]
    fn missing_symbol_fails() {
        let err = load_run_config(&make_config("[data]\ncsv_dir = x\n"), None).unwrap_err();
        assert!(matches!(err, AlgolabError::ConfigMissing { ref key, .. } if key == "symbol"));
    }

    #[test]
    fn missing_csv_dir_fails() {
        let err = load_run_config(&make_config("[backtest]\nsymbol = BHP\n"), None).unwrap_err();
        assert!(matches!(
            err,
            AlgolabError::ConfigMissing { ref section, ref key } if section == "data" && key == "csv_dir"
        ));
    }

    #[test]
    fn initial_capital_zero_fails() {
        let err = load_backtest_config(&make_config("[backtest]\ninitial_capital = 0\n")).unwrap_err();
        assert!(matches!(err, AlgolabError::ConfigInvalid { ref key, .. } if key == "initial_capital"));
    }

    #[test]
    fn unparseable_number_is_not_defaulted() {
        let err =
            load_backtest_config(&make_config("[backtest]\ncommission_rate = ten\n")).unwrap_err();
        assert!(matches!(err, AlgolabError::ConfigInvalid { ref key, .. } if key == "commission_rate"));
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let err = load_backtest_config(&make_config("[backtest]\nrisk_free_rate = 1.0\n")).unwrap_err();
        assert!(matches!(err, AlgolabError::ConfigInvalid { ref key, .. } if key == "risk_free_rate"));
    }

    #[test]
    fn unknown_settlement_fails() {
        let err = load_backtest_config(&make_config("[backtest]\nsettlement = magic\n")).unwrap_err();
        assert!(matches!(err, AlgolabError::ConfigInvalid { ref key, .. } if key == "settlement"));
    }

    #[test]
    fn invalid_start_date_format_fails() {
        let err = load_date_range(&make_config("[backtest]\nstart_date = 2020/01/01\n")).unwrap_err();
        assert!(matches!(err, AlgolabError::ConfigInvalid { ref key, .. } if key == "start_date"));
    }

    #[test]
    fn start_date_after_end_date_fails() {
        let err = load_date_range(&make_config(
            "[backtest]\nstart_date = 2024-12-31\nend_date = 2020-01-01\n",
        ))
        .unwrap_err();
        assert!(matches!(err, AlgolabError::ConfigInvalid { ref key, .. } if key == "start_date"));
    }

    #[test]
    fn open_ended_date_range() {
        let (start, end) = load_date_range(&make_config("[backtest]\nend_date = 2020-01-01\n")).unwrap();
        assert_eq!(start, None);
        assert_eq!(end, NaiveDate::from_ymd_opt(2020, 1, 1));
    }

    #[test]
    fn load_strategy_with_params_and_name() {
        let config = make_config(
            "[strategy]\nkind = ma_crossover\nname = Fast Cross\nfast_period = 3\nslow_period = 7\nunused = 9\n",
        );
        let strategy = load_strategy(&config).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::MovingAverageCrossover);
        assert_eq!(strategy.name(), "Fast Cross");
        match strategy {
            Strategy::MovingAverageCrossover(s) => {
                assert_eq!(s.fast_period, 3);
                assert_eq!(s.slow_period, 7);
            }
            other => panic!("unexpected strategy {other:?}"),
        }
    }

    #[test]
    fn load_strategy_defaults() {
        let strategy = load_strategy(&make_config("[strategy]\nkind = rsi\n")).unwrap();
        assert_eq!(strategy.name(), "RSI Strategy");
    }

    #[test]
    fn load_strategy_missing_kind() {
        let err = load_strategy(&make_config("[strategy]\nname = x\n")).unwrap_err();
        assert!(matches!(err, AlgolabError::ConfigMissing { ref key, .. } if key == "kind"));
        assert!(!has_strategy(&make_config("[strategy]\nname = x\n")));
    }

    #[test]
    fn load_strategy_unknown_kind() {
        let err = load_strategy(&make_config("[strategy]\nkind = bollinger\n")).unwrap_err();
        assert!(matches!(err, AlgolabError::UnknownStrategy { .. }));
    }

    #[test]
    fn load_strategy_invalid_params() {
        let err = load_strategy(&make_config(
            "[strategy]\nkind = macd\nfast_period = 30\nslow_period = 26\n",
        ))
        .unwrap_err();
        assert!(matches!(err, AlgolabError::StrategyParam { .. }));
    }
}
