//! Port traits implemented by the adapters.

pub mod config_port;
pub mod data_port;
pub mod fundamentals_port;
pub mod ledger_port;
pub mod report_port;
