//! Market scanner: latest signal status across a symbol list.
//!
//! Runs one strategy configuration over each symbol's history and reports
//! the state of the most recent bar. Per-symbol failures are tolerated
//! and tallied so one dead symbol never empties the scan.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::StratsimError;
use crate::domain::portfolio::SymbolFailure;
use crate::domain::signal::Stance;
use crate::domain::strategy::StrategySpec;
use crate::ports::data_port::DataPort;
use crate::ports::fundamentals_port::{Fundamentals, FundamentalsPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Fresh entry transition on the latest bar.
    Enter,
    /// Fresh exit transition on the latest bar.
    Exit,
    /// Invested, no transition today.
    Holding,
    /// Flat, no transition today.
    Flat,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanStatus::Enter => "ENTER",
            ScanStatus::Exit => "EXIT",
            ScanStatus::Holding => "HOLDING",
            ScanStatus::Flat => "FLAT",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone)]
pub struct ScanRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub status: ScanStatus,
    pub fundamentals: Option<Fundamentals>,
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub rows: Vec<ScanRow>,
    pub failures: Vec<SymbolFailure>,
}

pub fn scan_market(
    data_port: &dyn DataPort,
    fundamentals_port: Option<&dyn FundamentalsPort>,
    symbols: &[String],
    spec: &StrategySpec,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<ScanReport, StratsimError> {
    spec.validate()?;

    let mut rows = Vec::new();
    let mut failures = Vec::new();

    for symbol in symbols {
        let outcome = data_port
            .fetch_history(symbol, start_date, end_date)
            .and_then(|series| {
                if series.is_empty() {
                    return Err(StratsimError::NoData {
                        symbol: symbol.clone(),
                    });
                }
                spec.generate_signal(&series)
            });

        let signals = match outcome {
            Ok(s) => s,
            Err(e) => {
                failures.push(SymbolFailure {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let last = match signals.points().last() {
            Some(p) => p,
            None => continue,
        };

        let status = match (last.transition, last.stance) {
            (1, _) => ScanStatus::Enter,
            (-1, _) => ScanStatus::Exit,
            (_, Stance::Invested) => ScanStatus::Holding,
            (_, Stance::Flat) => ScanStatus::Flat,
        };

        let fundamentals = fundamentals_port
            .and_then(|port| port.fetch_fundamentals(symbol).ok());

        rows.push(ScanRow {
            symbol: symbol.clone(),
            date: last.date,
            close: last.close,
            status,
            fundamentals,
        });
    }

    Ok(ScanReport { rows, failures })
}
