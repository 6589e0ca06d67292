//! Data access port trait.

use crate::domain::error::StratsimError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort: std::fmt::Debug {
    /// Price history for a symbol over an explicit, inclusive date range.
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, StratsimError>;

    fn list_symbols(&self) -> Result<Vec<String>, StratsimError>;
}
