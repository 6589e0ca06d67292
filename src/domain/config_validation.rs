//! Configuration validation and extraction.
//!
//! Validates config fields before any engine runs, then builds the
//! domain values (strategy spec, date range, symbol list, grid axes)
//! from the validated sections.

use chrono::NaiveDate;

use crate::domain::error::StratsimError;
use crate::domain::strategy::StrategySpec;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StratsimError> {
    validate_initial_capital(config)?;
    validate_dates(config)?;
    validate_symbols(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), StratsimError> {
    strategy_from_config(config).map(|_| ())
}

pub fn validate_optimize_config(config: &dyn ConfigPort) -> Result<(), StratsimError> {
    grid_axes_from_config(config).map(|_| ())
}

/// Builds the configured strategy. `[strategy] type` selects the family,
/// the remaining keys supply its parameters; parameter relationships
/// (short < long etc.) are checked by `StrategySpec::validate`.
pub fn strategy_from_config(config: &dyn ConfigPort) -> Result<StrategySpec, StratsimError> {
    let kind = match config.get_string("strategy", "type") {
        Some(s) if !s.trim().is_empty() => s.trim().to_lowercase(),
        _ => {
            return Err(StratsimError::ConfigMissing {
                section: "strategy".to_string(),
                key: "type".to_string(),
            })
        }
    };

    let spec = match kind.as_str() {
        "ma_cross" => StrategySpec::MaCross {
            short: positive_window(config, "short_window", 20)?,
            long: positive_window(config, "long_window", 50)?,
        },
        "rsi" => StrategySpec::Rsi {
            period: positive_window(config, "rsi_period", 14)?,
            buy_threshold: config.get_double("strategy", "buy_threshold", 30.0),
            sell_threshold: config.get_double("strategy", "sell_threshold", 70.0),
        },
        "macd" => StrategySpec::Macd {
            fast: positive_window(config, "fast_period", 12)?,
            slow: positive_window(config, "slow_period", 26)?,
            signal: positive_window(config, "signal_period", 9)?,
        },
        "supertrend" => StrategySpec::SuperTrend {
            period: positive_window(config, "atr_period", 10)?,
            multiplier: config.get_double("strategy", "multiplier", 3.0),
        },
        other => {
            return Err(StratsimError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "type".to_string(),
                reason: format!(
                    "unknown strategy type '{}', expected ma_cross, rsi, macd or supertrend",
                    other
                ),
            })
        }
    };

    spec.validate()?;
    Ok(spec)
}

pub fn date_range_from_config(
    config: &dyn ConfigPort,
) -> Result<(NaiveDate, NaiveDate), StratsimError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;
    if start >= end {
        return Err(StratsimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok((start, end))
}

/// `[backtest] symbols` as a comma-separated list, or the single
/// `symbol` key. Whitespace around entries is trimmed.
pub fn symbols_from_config(config: &dyn ConfigPort) -> Result<Vec<String>, StratsimError> {
    let raw = config
        .get_string("backtest", "symbols")
        .or_else(|| config.get_string("backtest", "symbol"));

    let symbols: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return Err(StratsimError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        });
    }
    Ok(symbols)
}

/// Grid axes for moving-average optimization: `[optimize]`
/// short_start/short_end/short_step and long_start/long_end/long_step.
pub fn grid_axes_from_config(
    config: &dyn ConfigPort,
) -> Result<(Vec<usize>, Vec<usize>), StratsimError> {
    let shorts = axis_from_config(config, "short")?;
    let longs = axis_from_config(config, "long")?;
    Ok((shorts, longs))
}

fn axis_from_config(config: &dyn ConfigPort, prefix: &str) -> Result<Vec<usize>, StratsimError> {
    let start = axis_field(config, &format!("{}_start", prefix))?;
    let end = axis_field(config, &format!("{}_end", prefix))?;
    let step = axis_field(config, &format!("{}_step", prefix))?;

    if start > end {
        return Err(StratsimError::ConfigInvalid {
            section: "optimize".to_string(),
            key: format!("{}_start", prefix),
            reason: format!("{}_start must not exceed {}_end", prefix, prefix),
        });
    }
    Ok(crate::domain::optimizer::axis_values(start, end, step))
}

fn axis_field(config: &dyn ConfigPort, key: &str) -> Result<usize, StratsimError> {
    let value = config.get_int("optimize", key, 0);
    if value < 1 {
        return Err(StratsimError::ConfigInvalid {
            section: "optimize".to_string(),
            key: key.to_string(),
            reason: format!("{} must be at least 1", key),
        });
    }
    Ok(value as usize)
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), StratsimError> {
    let value = config.get_double("backtest", "initial_capital", 0.0);
    if value <= 0.0 {
        return Err(StratsimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), StratsimError> {
    date_range_from_config(config).map(|_| ())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), StratsimError> {
    symbols_from_config(config).map(|_| ())
}

fn positive_window(
    config: &dyn ConfigPort,
    key: &str,
    default: i64,
) -> Result<usize, StratsimError> {
    let value = config.get_int("strategy", key, default);
    if value < 1 {
        return Err(StratsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: key.to_string(),
            reason: format!("{} must be at least 1", key),
        });
    }
    Ok(value as usize)
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, StratsimError> {
    match value {
        None => Err(StratsimError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| StratsimError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            })
        }
    }
}
