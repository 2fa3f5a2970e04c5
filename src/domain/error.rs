//! Domain error types.

/// Top-level error type for algolab.
#[derive(Debug, thiserror::Error)]
pub enum AlgolabError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid parameter {parameter} for {strategy}: {reason}")]
    StrategyParam {
        strategy: String,
        parameter: String,
        reason: String,
    },

    #[error("unknown strategy kind: {kind}")]
    UnknownStrategy { kind: String },

    #[error("row {row}: missing field {field}")]
    MissingField { row: usize, field: String },

    #[error("row {row}: invalid {field}: {reason}")]
    InvalidField {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("bar {index}: timestamp is not strictly after the previous bar")]
    NonMonotonicTimestamp { index: usize },

    #[error("bar {index}: {reason}")]
    InvalidPrice { index: usize, reason: String },

    #[error("signal {index}: value {value} is not one of -1, 0, 1")]
    InvalidSignal { index: usize, value: i64 },

    #[error("signal series has {signals} entries but price series has {bars}")]
    LengthMismatch { bars: usize, signals: usize },

    #[error("price series is empty")]
    EmptySeries,

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AlgolabError {
    /// Invalid run configuration or strategy parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AlgolabError::ConfigParse { .. }
                | AlgolabError::ConfigMissing { .. }
                | AlgolabError::ConfigInvalid { .. }
                | AlgolabError::StrategyParam { .. }
                | AlgolabError::UnknownStrategy { .. }
        )
    }

    /// Malformed price bars or signal values.
    pub fn is_data_contract(&self) -> bool {
        matches!(
            self,
            AlgolabError::MissingField { .. }
                | AlgolabError::InvalidField { .. }
                | AlgolabError::NonMonotonicTimestamp { .. }
                | AlgolabError::InvalidPrice { .. }
                | AlgolabError::InvalidSignal { .. }
                | AlgolabError::LengthMismatch { .. }
                | AlgolabError::EmptySeries
        )
    }

    pub(crate) fn strategy_param(strategy: &str, parameter: &str, reason: impl Into<String>) -> Self {
        AlgolabError::StrategyParam {
            strategy: strategy.to_string(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

impl AlgolabError {
    /// Process exit status for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            AlgolabError::Json(_) | AlgolabError::Report { .. } => 1,
            AlgolabError::ConfigParse { .. }
            | AlgolabError::ConfigMissing { .. }
            | AlgolabError::ConfigInvalid { .. } => 2,
            AlgolabError::Data { .. } => 3,
            AlgolabError::StrategyParam { .. } | AlgolabError::UnknownStrategy { .. } => 4,
            AlgolabError::MissingField { .. }
            | AlgolabError::InvalidField { .. }
            | AlgolabError::NonMonotonicTimestamp { .. }
            | AlgolabError::InvalidPrice { .. }
            | AlgolabError::InvalidSignal { .. }
            | AlgolabError::LengthMismatch { .. }
            | AlgolabError::EmptySeries => 5,
        }
    }
}

impl From<&AlgolabError> for std::process::ExitCode {
    fn from(err: &AlgolabError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_param_is_configuration() {
        let err = AlgolabError::strategy_param("RSI Strategy", "rsi_period", "must be >= 2");
        assert!(err.is_configuration());
        assert!(!err.is_data_contract());
        assert_eq!(
            err.to_string(),
            "invalid parameter rsi_period for RSI Strategy: must be >= 2"
        );
    }

    #[test]
    fn invalid_signal_is_data_contract() {
        let err = AlgolabError::InvalidSignal { index: 3, value: 2 };
        assert!(err.is_data_contract());
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "signal 3: value 2 is not one of -1, 0, 1");
    }

    #[test]
    fn report_error_is_neither_kind() {
        let err = AlgolabError::Report {
            reason: "disk full".into(),
        };
        assert!(!err.is_configuration());
        assert!(!err.is_data_contract());
    }

    #[test]
    fn exit_codes_by_kind() {
        let missing = AlgolabError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        };
        assert_eq!(missing.exit_code(), 2);
        assert_eq!(AlgolabError::Data { reason: "x".into() }.exit_code(), 3);
        assert_eq!(AlgolabError::UnknownStrategy { kind: "x".into() }.exit_code(), 4);
        assert_eq!(AlgolabError::EmptySeries.exit_code(), 5);
        assert_eq!(AlgolabError::Report { reason: "x".into() }.exit_code(), 1);
    }
}
