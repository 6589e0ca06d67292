//! Fundamentals access port trait (scanning only).

/// Company fundamentals snapshot. Fields default to empty strings and
/// zeros when the upstream source has no value; a failed lookup is
/// reported through `Result`, never as a panic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fundamentals {
    pub sector: String,
    pub industry: String,
    pub market_cap: f64,
    pub pe_ratio: f64,
    pub forward_pe: f64,
    pub eps: f64,
    pub volume: i64,
}

use crate::domain::error::StratsimError;

pub trait FundamentalsPort {
    /// Fundamentals for a symbol, or the documented zero/placeholder
    /// defaults when the symbol is unknown.
    fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, StratsimError>;
}
