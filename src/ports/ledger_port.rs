//! Paper-ledger persistence port trait.

use crate::domain::error::StratsimError;
use crate::domain::ledger::LedgerState;

pub trait LedgerPort {
    /// Load the account, initializing a fresh one with `starting_cash`
    /// when no saved state exists yet.
    fn load(&self, starting_cash: f64) -> Result<LedgerState, StratsimError>;

    fn save(&self, state: &LedgerState) -> Result<(), StratsimError>;
}
