//! Multi-symbol portfolio aggregation under an equal capital split.
//!
//! One strategy configuration runs independently across N symbols, each
//! seeded with capital/N. Fetching stays on the sequential caller path
//! (the external source sets the pace); simulations fan out on the rayon
//! pool. A failing symbol is excluded and reported, never fatal; the
//! remaining symbols complete unaffected.
//!
//! Aggregation walks the union of observed dates. On a date a symbol has
//! no bar for, it contributes its last known equity (carry-forward);
//! before its first bar it contributes its seed allocation. Summing a
//! missing symbol as zero would make the aggregate dip by a full
//! allocation on gap days.

use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeSet;

use crate::domain::error::StratsimError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::simulation::{run_simulation, SimulationResult};
use crate::domain::strategy::StrategySpec;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub allocation: f64,
    pub result: SimulationResult,
}

#[derive(Debug, Clone)]
pub struct SymbolFailure {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatePoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct PortfolioReport {
    pub outcomes: Vec<SymbolOutcome>,
    pub failures: Vec<SymbolFailure>,
    /// Combined curve over succeeded symbols; `None` when none succeeded.
    /// An undefined aggregate is reported as such, never as zero.
    pub aggregate: Option<Vec<AggregatePoint>>,
    /// Capital actually allocated to succeeded symbols.
    pub allocated_capital: f64,
    /// Aggregate return over `allocated_capital`; `None` with no successes.
    pub total_return: Option<f64>,
}

pub fn run_portfolio(
    data_port: &dyn DataPort,
    symbols: &[String],
    spec: &StrategySpec,
    total_capital: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<PortfolioReport, StratsimError> {
    spec.validate()?;
    if total_capital <= 0.0 {
        return Err(StratsimError::InvalidParameter {
            name: "total_capital".into(),
            reason: "must be positive".into(),
        });
    }
    if symbols.is_empty() {
        return Err(StratsimError::InvalidParameter {
            name: "symbols".into(),
            reason: "portfolio needs at least one symbol".into(),
        });
    }

    let allocation = total_capital / symbols.len() as f64;

    // Sequential fetch phase: upstream rate limits are the provider's
    // concern, not the simulation pool's.
    let mut fetched: Vec<(String, PriceSeries)> = Vec::new();
    let mut failures: Vec<SymbolFailure> = Vec::new();
    for symbol in symbols {
        match data_port.fetch_history(symbol, start_date, end_date) {
            Ok(series) if series.is_empty() => failures.push(SymbolFailure {
                symbol: symbol.clone(),
                reason: "no data returned".into(),
            }),
            Ok(series) => fetched.push((symbol.clone(), series)),
            Err(e) => failures.push(SymbolFailure {
                symbol: symbol.clone(),
                reason: e.to_string(),
            }),
        }
    }

    // Parallel simulation phase.
    let simulated: Vec<Result<SymbolOutcome, SymbolFailure>> = fetched
        .par_iter()
        .map(|(symbol, series)| {
            spec.generate_signal(series)
                .and_then(|signals| run_simulation(&signals, allocation))
                .map(|result| SymbolOutcome {
                    symbol: symbol.clone(),
                    allocation,
                    result,
                })
                .map_err(|e| SymbolFailure {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                })
        })
        .collect();

    let mut outcomes = Vec::new();
    for item in simulated {
        match item {
            Ok(outcome) => outcomes.push(outcome),
            Err(failure) => failures.push(failure),
        }
    }

    let aggregate = combine_curves(&outcomes);
    let allocated_capital = allocation * outcomes.len() as f64;
    let total_return = aggregate.as_ref().and_then(|curve| {
        curve
            .last()
            .map(|point| point.equity / allocated_capital - 1.0)
    });

    Ok(PortfolioReport {
        outcomes,
        failures,
        aggregate,
        allocated_capital,
        total_return,
    })
}

fn combine_curves(outcomes: &[SymbolOutcome]) -> Option<Vec<AggregatePoint>> {
    if outcomes.is_empty() {
        return None;
    }

    let dates: BTreeSet<NaiveDate> = outcomes
        .iter()
        .flat_map(|o| o.result.equity_curve.iter().map(|p| p.date))
        .collect();

    // One cursor per symbol; each advances through its own curve as the
    // union timeline moves forward.
    let mut cursors = vec![0usize; outcomes.len()];
    let mut last_equity: Vec<f64> = outcomes.iter().map(|o| o.allocation).collect();

    let mut combined = Vec::with_capacity(dates.len());
    for date in dates {
        let mut total = 0.0;
        for (i, outcome) in outcomes.iter().enumerate() {
            let curve = &outcome.result.equity_curve;
            while cursors[i] < curve.len() && curve[cursors[i]].date <= date {
                last_equity[i] = curve[cursors[i]].equity;
                cursors[i] += 1;
            }
            total += last_equity[i];
        }
        combined.push(AggregatePoint {
            date,
            equity: total,
        });
    }

    Some(combined)
}
