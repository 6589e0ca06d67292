//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_fundamentals_adapter;
pub mod file_config_adapter;
pub mod json_ledger_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod typst_report;
