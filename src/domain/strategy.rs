//! Strategy variants and signal generation.
//!
//! A strategy is a closed enum of parametric variants sharing one
//! capability: turn a `PriceSeries` into a `SignalSeries`, using only
//! information up to and including each bar. Selection happens by value at
//! runtime; there is no trait object or inheritance chain.
//!
//! Warm-up bars (indicator not yet computable) are reported as invalid
//! indicator points with a Flat stance, never thrown. A series with bars
//! but no post-warm-up bar at all is a computation error.

use std::collections::HashMap;
use std::fmt;

use crate::domain::error::StratsimError;
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::supertrend::calculate_supertrend;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{SignalSeries, Stance};

#[derive(Debug, Clone, PartialEq)]
pub enum StrategySpec {
    /// Invested while SMA(close, short) > SMA(close, long). Requires
    /// short < long.
    MaCross { short: usize, long: usize },
    /// Two-state machine over Wilder RSI: drop below `buy_threshold`
    /// enters, rise above `sell_threshold` exits, anything in between
    /// holds the last state. Before any trigger the stance is Flat:
    /// a policy choice, not a fill artifact.
    Rsi {
        period: usize,
        buy_threshold: f64,
        sell_threshold: f64,
    },
    /// Invested while the MACD line is above its signal-period EMA.
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// Invested while the SuperTrend direction flag is up.
    SuperTrend { period: usize, multiplier: f64 },
}

impl fmt::Display for StrategySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategySpec::MaCross { short, long } => write!(f, "ma_cross({},{})", short, long),
            StrategySpec::Rsi {
                period,
                buy_threshold,
                sell_threshold,
            } => write!(f, "rsi({},{},{})", period, buy_threshold, sell_threshold),
            StrategySpec::Macd { fast, slow, signal } => {
                write!(f, "macd({},{},{})", fast, slow, signal)
            }
            StrategySpec::SuperTrend { period, multiplier } => {
                write!(f, "supertrend({},{})", period, multiplier)
            }
        }
    }
}

impl StrategySpec {
    /// Parameter domain checks. Called by `generate_signal`, and directly
    /// by config validation so bad parameters fail before any data fetch.
    pub fn validate(&self) -> Result<(), StratsimError> {
        match *self {
            StrategySpec::MaCross { short, long } => {
                if short == 0 {
                    return Err(invalid("short_window", "must be at least 1"));
                }
                if short >= long {
                    return Err(invalid(
                        "short_window",
                        "must be less than long_window",
                    ));
                }
            }
            StrategySpec::Rsi {
                period,
                buy_threshold,
                sell_threshold,
            } => {
                if period == 0 {
                    return Err(invalid("period", "must be at least 1"));
                }
                if !(0.0..=100.0).contains(&buy_threshold)
                    || !(0.0..=100.0).contains(&sell_threshold)
                {
                    return Err(invalid("thresholds", "must be within 0..=100"));
                }
                if buy_threshold >= sell_threshold {
                    return Err(invalid(
                        "buy_threshold",
                        "must be less than sell_threshold",
                    ));
                }
            }
            StrategySpec::Macd { fast, slow, signal } => {
                if fast == 0 || signal == 0 {
                    return Err(invalid("fast/signal", "must be at least 1"));
                }
                if fast >= slow {
                    return Err(invalid("fast", "must be less than slow"));
                }
            }
            StrategySpec::SuperTrend { period, multiplier } => {
                if period == 0 {
                    return Err(invalid("period", "must be at least 1"));
                }
                if multiplier <= 0.0 {
                    return Err(invalid("multiplier", "must be positive"));
                }
            }
        }
        Ok(())
    }

    /// Generate the stance sequence for a price series. Pure: identical
    /// (series, parameters) always yield the identical signal series.
    pub fn generate_signal(&self, series: &PriceSeries) -> Result<SignalSeries, StratsimError> {
        self.validate()?;

        let (stances, indicators) = match *self {
            StrategySpec::MaCross { short, long } => ma_cross_stances(series, short, long),
            StrategySpec::Rsi {
                period,
                buy_threshold,
                sell_threshold,
            } => rsi_stances(series, period, buy_threshold, sell_threshold),
            StrategySpec::Macd { fast, slow, signal } => macd_stances(series, fast, slow, signal),
            StrategySpec::SuperTrend { period, multiplier } => {
                supertrend_stances(series, period, multiplier)
            }
        };

        // At least one bar must have every indicator column computable,
        // otherwise no decision ever leaves warm-up.
        let any_decision_bar = (0..series.len())
            .any(|i| indicators.values().all(|s| s.values[i].valid));
        if !series.is_empty() && !any_decision_bar {
            let warmup = indicators
                .values()
                .map(|s| s.warmup_len())
                .max()
                .unwrap_or(0);
            return Err(StratsimError::NoValidBars {
                symbol: series.symbol().to_string(),
                warmup,
            });
        }

        Ok(SignalSeries::from_stances(series, stances, indicators))
    }
}

fn invalid(name: &str, reason: &str) -> StratsimError {
    StratsimError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

type StanceBundle = (Vec<Stance>, HashMap<IndicatorType, IndicatorSeries>);

fn ma_cross_stances(series: &PriceSeries, short: usize, long: usize) -> StanceBundle {
    let short_sma = calculate_sma(series.bars(), short);
    let long_sma = calculate_sma(series.bars(), long);

    let stances = short_sma
        .values
        .iter()
        .zip(&long_sma.values)
        .map(|(s, l)| {
            if s.valid && l.valid {
                let sv = s.value.as_simple().unwrap_or(0.0);
                let lv = l.value.as_simple().unwrap_or(0.0);
                if sv > lv {
                    Stance::Invested
                } else {
                    Stance::Flat
                }
            } else {
                Stance::Flat
            }
        })
        .collect();

    let mut indicators = HashMap::new();
    indicators.insert(IndicatorType::Sma(short), short_sma);
    indicators.insert(IndicatorType::Sma(long), long_sma);
    (stances, indicators)
}

fn rsi_stances(series: &PriceSeries, period: usize, buy: f64, sell: f64) -> StanceBundle {
    let rsi = calculate_rsi(series.bars(), period);

    // Explicit two-state machine: oversold trigger enters, overbought
    // trigger exits, otherwise hold. Initial state is Flat.
    let mut state = Stance::Flat;
    let stances = rsi
        .values
        .iter()
        .map(|point| {
            if point.valid {
                let value = point.value.as_simple().unwrap_or(0.0);
                if value < buy {
                    state = Stance::Invested;
                } else if value > sell {
                    state = Stance::Flat;
                }
            }
            state
        })
        .collect();

    let mut indicators = HashMap::new();
    indicators.insert(IndicatorType::Rsi(period), rsi);
    (stances, indicators)
}

fn macd_stances(series: &PriceSeries, fast: usize, slow: usize, signal: usize) -> StanceBundle {
    let macd = calculate_macd(series.bars(), fast, slow, signal);

    let stances = macd
        .values
        .iter()
        .map(|point| match point.value {
            IndicatorValue::Macd { line, signal, .. } if point.valid && line > signal => {
                Stance::Invested
            }
            _ => Stance::Flat,
        })
        .collect();

    let mut indicators = HashMap::new();
    indicators.insert(IndicatorType::Macd { fast, slow, signal }, macd);
    (stances, indicators)
}

fn supertrend_stances(series: &PriceSeries, period: usize, multiplier: f64) -> StanceBundle {
    let st = calculate_supertrend(series.bars(), period, multiplier);

    let stances = st
        .values
        .iter()
        .map(|point| match point.value {
            IndicatorValue::SuperTrend { up: true, .. } if point.valid => Stance::Invested,
            _ => Stance::Flat,
        })
        .collect();

    let mut indicators = HashMap::new();
    indicators.insert(st.indicator_type.clone(), st);
    (stances, indicators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1000,
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    fn stances(signals: &SignalSeries) -> Vec<Stance> {
        signals.points().iter().map(|p| p.stance).collect()
    }

    #[test]
    fn validate_rejects_short_ge_long() {
        assert!(StrategySpec::MaCross { short: 50, long: 20 }.validate().is_err());
        assert!(StrategySpec::MaCross { short: 20, long: 20 }.validate().is_err());
        assert!(StrategySpec::MaCross { short: 20, long: 50 }.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_rsi_thresholds() {
        let bad = StrategySpec::Rsi {
            period: 14,
            buy_threshold: 70.0,
            sell_threshold: 30.0,
        };
        assert!(bad.validate().is_err());

        let out_of_range = StrategySpec::Rsi {
            period: 14,
            buy_threshold: -5.0,
            sell_threshold: 70.0,
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn validate_rejects_macd_fast_ge_slow() {
        let bad = StrategySpec::Macd {
            fast: 26,
            slow: 12,
            signal: 9,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn validate_rejects_nonpositive_multiplier() {
        let bad = StrategySpec::SuperTrend {
            period: 10,
            multiplier: 0.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn ma_cross_known_scenario() {
        // Close = [10,11,9,12,13], short=1, long=2:
        // SMA_short = close, SMA_long = 2-bar average.
        // Bar 0: long warm-up → Flat.
        // Bar 1: 11 > 10.5 → Invested. Bar 2: 9 < 10 → Flat.
        // Bar 3: 12 > 10.5 → Invested. Bar 4: 13 > 12.5 → Invested.
        let spec = StrategySpec::MaCross { short: 1, long: 2 };
        let signals = spec.generate_signal(&series(&[10.0, 11.0, 9.0, 12.0, 13.0])).unwrap();

        assert_eq!(
            stances(&signals),
            vec![
                Stance::Flat,
                Stance::Invested,
                Stance::Flat,
                Stance::Invested,
                Stance::Invested,
            ]
        );
        let transitions: Vec<i8> = signals.points().iter().map(|p| p.transition).collect();
        assert_eq!(transitions, vec![0, 1, -1, 1, 0]);
    }

    #[test]
    fn ma_cross_warmup_is_flat() {
        let spec = StrategySpec::MaCross { short: 2, long: 4 };
        let signals = spec
            .generate_signal(&series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]))
            .unwrap();

        for point in &signals.points()[..3] {
            assert_eq!(point.stance, Stance::Flat);
        }
    }

    #[test]
    fn ma_cross_exposes_both_sma_columns() {
        let spec = StrategySpec::MaCross { short: 1, long: 2 };
        let signals = spec.generate_signal(&series(&[10.0, 11.0, 12.0])).unwrap();

        assert!(signals.indicator(&IndicatorType::Sma(1)).is_some());
        assert!(signals.indicator(&IndicatorType::Sma(2)).is_some());
    }

    #[test]
    fn rsi_pre_trigger_stance_is_flat() {
        // Steady small oscillation keeps RSI between thresholds: no
        // trigger ever fires, stance stays Flat throughout.
        let closes: Vec<f64> = (0..20)
            .map(|i| 100.0 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let spec = StrategySpec::Rsi {
            period: 5,
            buy_threshold: 10.0,
            sell_threshold: 90.0,
        };
        let signals = spec.generate_signal(&series(&closes)).unwrap();
        assert!(stances(&signals).iter().all(|&s| s == Stance::Flat));
    }

    #[test]
    fn rsi_state_machine_enters_and_holds() {
        // Crash drives RSI to 0 (enter), then a mild drift keeps it
        // between thresholds (hold).
        let mut closes: Vec<f64> = (0..8).map(|i| 100.0 - i as f64 * 8.0).collect();
        closes.extend([45.0, 44.0, 45.0, 44.0, 45.0]);
        let spec = StrategySpec::Rsi {
            period: 5,
            buy_threshold: 30.0,
            sell_threshold: 70.0,
        };
        let signals = spec.generate_signal(&series(&closes)).unwrap();

        let sts = stances(&signals);
        assert_eq!(*sts.last().unwrap(), Stance::Invested);
        // Once entered, never exits in this scenario.
        let first_entry = sts.iter().position(|&s| s == Stance::Invested).unwrap();
        assert!(sts[first_entry..].iter().all(|&s| s == Stance::Invested));
    }

    #[test]
    fn rsi_exits_on_overbought() {
        // Crash (enter), then a strong rally pushing RSI above 70 (exit).
        let mut closes: Vec<f64> = (0..8).map(|i| 100.0 - i as f64 * 8.0).collect();
        closes.extend((0..10).map(|i| 40.0 + i as f64 * 10.0));
        let spec = StrategySpec::Rsi {
            period: 5,
            buy_threshold: 30.0,
            sell_threshold: 70.0,
        };
        let signals = spec.generate_signal(&series(&closes)).unwrap();

        assert_eq!(*stances(&signals).last().unwrap(), Stance::Flat);
        assert!(stances(&signals).contains(&Stance::Invested));
    }

    #[test]
    fn macd_uptrend_invests_after_warmup() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 1.02f64.powi(i)).collect();
        let spec = StrategySpec::Macd {
            fast: 3,
            slow: 6,
            signal: 4,
        };
        let signals = spec.generate_signal(&series(&closes)).unwrap();
        assert_eq!(*stances(&signals).last().unwrap(), Stance::Invested);
    }

    #[test]
    fn supertrend_uptrend_invests() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 3.0).collect();
        let spec = StrategySpec::SuperTrend {
            period: 3,
            multiplier: 1.0,
        };
        let signals = spec.generate_signal(&series(&closes)).unwrap();
        assert_eq!(*stances(&signals).last().unwrap(), Stance::Invested);
    }

    #[test]
    fn all_warmup_series_is_computation_error() {
        let spec = StrategySpec::MaCross { short: 5, long: 10 };
        let result = spec.generate_signal(&series(&[10.0, 11.0, 12.0]));
        assert!(matches!(result, Err(StratsimError::NoValidBars { .. })));
    }

    #[test]
    fn generate_signal_is_deterministic() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + ((i * 13) % 7) as f64).collect();
        let spec = StrategySpec::MaCross { short: 3, long: 8 };
        let a = spec.generate_signal(&series(&closes)).unwrap();
        let b = spec.generate_signal(&series(&closes)).unwrap();
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn display_names() {
        assert_eq!(
            StrategySpec::MaCross { short: 20, long: 50 }.to_string(),
            "ma_cross(20,50)"
        );
        assert_eq!(
            StrategySpec::SuperTrend {
                period: 10,
                multiplier: 3.0
            }
            .to_string(),
            "supertrend(10,3)"
        );
    }
}
