//! Paper trading ledger.
//!
//! A cash balance plus open positions, mutated by buy/sell orders at
//! caller-supplied prices. No fills, commissions or slippage are
//! modelled; an order either settles in full at the given price or is
//! rejected. State is serde-serializable so an adapter can persist it
//! between runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::error::StratsimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub side: TradeSide,
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
}

/// An open position. `avg_price` is the volume-weighted average of all
/// buys still open; sells realize at that basis without changing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub quantity: f64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub cash: f64,
    /// BTreeMap keeps serialized output and summaries in symbol order.
    pub positions: BTreeMap<String, Position>,
    pub history: Vec<TradeRecord>,
}

impl LedgerState {
    pub fn new(starting_cash: f64) -> Self {
        LedgerState {
            cash: starting_cash,
            positions: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    pub fn buy(
        &mut self,
        date: NaiveDate,
        symbol: &str,
        quantity: f64,
        price: f64,
    ) -> Result<(), StratsimError> {
        check_order(symbol, quantity, price)?;

        let cost = quantity * price;
        if cost > self.cash {
            return Err(StratsimError::Ledger {
                reason: format!(
                    "insufficient funds for {}: order costs {:.2}, cash is {:.2}",
                    symbol, cost, self.cash
                ),
            });
        }

        self.cash -= cost;
        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert(Position {
                quantity: 0.0,
                avg_price: 0.0,
            });
        let total_cost = position.avg_price * position.quantity + cost;
        position.quantity += quantity;
        position.avg_price = total_cost / position.quantity;

        self.history.push(TradeRecord {
            date,
            side: TradeSide::Buy,
            symbol: symbol.to_string(),
            quantity,
            price,
        });
        Ok(())
    }

    pub fn sell(
        &mut self,
        date: NaiveDate,
        symbol: &str,
        quantity: f64,
        price: f64,
    ) -> Result<(), StratsimError> {
        check_order(symbol, quantity, price)?;

        let held = self.positions.get(symbol).map_or(0.0, |p| p.quantity);
        if quantity > held {
            return Err(StratsimError::Ledger {
                reason: format!(
                    "insufficient holdings of {}: want to sell {}, hold {}",
                    symbol, quantity, held
                ),
            });
        }

        self.cash += quantity * price;
        if let Some(position) = self.positions.get_mut(symbol) {
            position.quantity -= quantity;
            if position.quantity <= 0.0 {
                self.positions.remove(symbol);
            }
        }

        self.history.push(TradeRecord {
            date,
            side: TradeSide::Sell,
            symbol: symbol.to_string(),
            quantity,
            price,
        });
        Ok(())
    }

    /// Cash plus positions marked at the supplied prices. Positions
    /// without a quote fall back to their average entry price.
    pub fn total_value(&self, quotes: &BTreeMap<String, f64>) -> f64 {
        let holdings: f64 = self
            .positions
            .iter()
            .map(|(symbol, p)| {
                let mark = quotes.get(symbol).copied().unwrap_or(p.avg_price);
                p.quantity * mark
            })
            .sum();
        self.cash + holdings
    }
}

fn check_order(symbol: &str, quantity: f64, price: f64) -> Result<(), StratsimError> {
    if !(quantity > 0.0) {
        return Err(StratsimError::Ledger {
            reason: format!("order quantity for {} must be positive, got {}", symbol, quantity),
        });
    }
    if !(price > 0.0) {
        return Err(StratsimError::Ledger {
            reason: format!("order price for {} must be positive, got {}", symbol, price),
        });
    }
    Ok(())
}
