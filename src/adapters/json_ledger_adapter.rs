//! JSON file ledger adapter.
//!
//! Persists the paper account as pretty-printed JSON at a fixed path.
//! A missing file is not an error: `load` starts a fresh account with
//! the supplied cash.

use crate::domain::error::StratsimError;
use crate::domain::ledger::LedgerState;
use crate::ports::ledger_port::LedgerPort;
use std::fs;
use std::path::PathBuf;

pub struct JsonLedgerAdapter {
    path: PathBuf,
}

impl JsonLedgerAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl LedgerPort for JsonLedgerAdapter {
    fn load(&self, starting_cash: f64) -> Result<LedgerState, StratsimError> {
        if !self.path.exists() {
            return Ok(LedgerState::new(starting_cash));
        }
        let content = fs::read_to_string(&self.path).map_err(|e| StratsimError::Ledger {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| StratsimError::Ledger {
            reason: format!("malformed ledger file {}: {}", self.path.display(), e),
        })
    }

    fn save(&self, state: &LedgerState) -> Result<(), StratsimError> {
        let json = serde_json::to_string_pretty(state).map_err(|e| StratsimError::Ledger {
            reason: format!("failed to serialize ledger: {}", e),
        })?;
        fs::write(&self.path, json).map_err(|e| StratsimError::Ledger {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn load_without_file_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonLedgerAdapter::new(dir.path().join("ledger.json"));

        let state = adapter.load(25_000.0).unwrap();
        assert_eq!(state.cash, 25_000.0);
        assert!(state.positions.is_empty());
        assert!(state.history.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonLedgerAdapter::new(dir.path().join("ledger.json"));

        let mut state = LedgerState::new(10_000.0);
        state
            .buy(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                "BHP",
                100.0,
                45.0,
            )
            .unwrap();
        adapter.save(&state).unwrap();

        // Starting cash is ignored once a file exists.
        let restored = adapter.load(999.0).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn malformed_file_is_a_ledger_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{not json").unwrap();
        let adapter = JsonLedgerAdapter::new(path);

        let err = adapter.load(10_000.0).unwrap_err();
        assert!(matches!(err, StratsimError::Ledger { .. }));
    }
}
