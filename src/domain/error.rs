//! Domain error types.
//!
//! Taxonomy: data errors (empty/insufficient input), config errors (invalid
//! parameters), computation errors (no bars survive warm-up). The batch
//! engines (optimizer, portfolio, scanner) catch per-unit errors and tally
//! them; everything else propagates to the caller.

/// Top-level error type for stratsim.
#[derive(Debug, thiserror::Error)]
pub enum StratsimError {
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

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("price series for {symbol} is malformed: {reason}")]
    MalformedSeries { symbol: String, reason: String },

    #[error("no valid bars for {symbol} after {warmup}-bar warm-up")]
    NoValidBars { symbol: String, warmup: usize },

    #[error("ledger error: {reason}")]
    Ledger { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratsimError> for std::process::ExitCode {
    fn from(err: &StratsimError) -> Self {
        let code: u8 = match err {
            StratsimError::Io(_) => 1,
            StratsimError::ConfigParse { .. }
            | StratsimError::ConfigMissing { .. }
            | StratsimError::ConfigInvalid { .. }
            | StratsimError::InvalidParameter { .. } => 2,
            StratsimError::Database { .. } | StratsimError::DatabaseQuery { .. } => 3,
            StratsimError::Ledger { .. } => 4,
            StratsimError::NoData { .. }
            | StratsimError::InsufficientData { .. }
            | StratsimError::MalformedSeries { .. }
            | StratsimError::NoValidBars { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_insufficient_data() {
        let err = StratsimError::InsufficientData {
            symbol: "AAPL".into(),
            bars: 1,
            minimum: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for AAPL: have 1 bars, need 2"
        );
    }

    #[test]
    fn error_display_config_invalid() {
        let err = StratsimError::ConfigInvalid {
            section: "strategy".into(),
            key: "short_window".into(),
            reason: "must be less than long_window".into(),
        };
        assert!(err.to_string().contains("[strategy] short_window"));
    }

    #[test]
    fn exit_code_mapping() {
        use std::process::ExitCode;

        let data_err = StratsimError::NoData {
            symbol: "BHP".into(),
        };
        let config_err = StratsimError::ConfigMissing {
            section: "backtest".into(),
            key: "initial_capital".into(),
        };
        // ExitCode has no accessor; just confirm the conversions compile and run.
        let _: ExitCode = (&data_err).into();
        let _: ExitCode = (&config_err).into();
    }
}
