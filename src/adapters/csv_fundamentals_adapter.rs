//! CSV fundamentals adapter.
//!
//! Reads a single `fundamentals.csv`-style file with a
//! `symbol,sector,industry,market_cap,pe_ratio,forward_pe,eps,volume`
//! header. Numeric fields left blank fall back to zero, matching the
//! documented `Fundamentals` defaults.

use crate::domain::error::StratsimError;
use crate::ports::fundamentals_port::{Fundamentals, FundamentalsPort};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct CsvFundamentalsAdapter {
    rows: HashMap<String, Fundamentals>,
}

impl CsvFundamentalsAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StratsimError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| StratsimError::Database {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StratsimError::Database {
                reason: format!("CSV parse error: {}", e),
            })?;

            let symbol = record
                .get(0)
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_default();
            if symbol.is_empty() {
                continue;
            }

            rows.insert(
                symbol,
                Fundamentals {
                    sector: text(&record, 1),
                    industry: text(&record, 2),
                    market_cap: number(&record, 3),
                    pe_ratio: number(&record, 4),
                    forward_pe: number(&record, 5),
                    eps: number(&record, 6),
                    volume: number(&record, 7) as i64,
                },
            );
        }

        Ok(Self { rows })
    }
}

fn text(record: &csv::StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").trim().to_string()
}

fn number(record: &csv::StringRecord, index: usize) -> f64 {
    record
        .get(index)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0.0)
}

impl FundamentalsPort for CsvFundamentalsAdapter {
    fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, StratsimError> {
        Ok(self
            .rows
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn adapter_from(content: &str) -> CsvFundamentalsAdapter {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        CsvFundamentalsAdapter::from_file(file.path()).unwrap()
    }

    #[test]
    fn known_symbol_returns_row() {
        let adapter = adapter_from(
            "symbol,sector,industry,market_cap,pe_ratio,forward_pe,eps,volume\n\
             BHP,Materials,Mining,120000000000,12.5,11.0,4.2,5000000\n",
        );

        let f = adapter.fetch_fundamentals("bhp").unwrap();
        assert_eq!(f.sector, "Materials");
        assert_eq!(f.pe_ratio, 12.5);
        assert_eq!(f.volume, 5_000_000);
    }

    #[test]
    fn unknown_symbol_returns_defaults() {
        let adapter =
            adapter_from("symbol,sector,industry,market_cap,pe_ratio,forward_pe,eps,volume\n");
        let f = adapter.fetch_fundamentals("GHOST").unwrap();
        assert_eq!(f, Fundamentals::default());
    }

    #[test]
    fn blank_numeric_fields_are_zero() {
        let adapter = adapter_from(
            "symbol,sector,industry,market_cap,pe_ratio,forward_pe,eps,volume\n\
             CBA,Financials,Banks,,,,,\n",
        );
        let f = adapter.fetch_fundamentals("CBA").unwrap();
        assert_eq!(f.sector, "Financials");
        assert_eq!(f.market_cap, 0.0);
        assert_eq!(f.eps, 0.0);
    }

    #[test]
    fn missing_file_errors() {
        assert!(CsvFundamentalsAdapter::from_file("/nonexistent/fundamentals.csv").is_err());
    }
}
