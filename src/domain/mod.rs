//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod strategy;
pub mod simulation;
pub mod metrics;
pub mod optimizer;
pub mod portfolio;
pub mod scanner;
pub mod patterns;
pub mod ledger;
pub mod config_validation;
pub mod error;
