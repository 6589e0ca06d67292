//! Brute-force parameter grid search for the MA-cross strategy.
//!
//! Evaluates every (short, long) pair of the grid with short < long; each
//! surviving pair runs the full signal → simulation pipeline independently
//! on the rayon pool. Pairs whose simulation fails are excluded and
//! tallied, never propagated; one bad pair must not abort the search.
//!
//! Ranking is fully deterministic: total return descending, ties broken by
//! drawdown closer to zero, then by (short, long) ascending.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::error::StratsimError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::strategy::StrategySpec;

use super::simulation::run_simulation;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRow {
    pub short: usize,
    pub long: usize,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
}

#[derive(Debug, Clone)]
pub struct OptimizationReport {
    /// Ranked result rows, best first. Empty when no combination was valid.
    pub rows: Vec<OptimizationRow>,
    pub evaluated: usize,
    /// Combinations pruned by the short < long domain constraint.
    pub skipped_constraint: usize,
    /// Combinations whose simulation failed (warm-up ate the series, etc.).
    pub skipped_error: usize,
    /// True when the caller's cancellation flag stopped the search early.
    pub cancelled: bool,
}

impl OptimizationReport {
    /// The top-ranked row; `None` when the valid-combination set was empty,
    /// which callers must report explicitly rather than as a zero result.
    pub fn best(&self) -> Option<&OptimizationRow> {
        self.rows.first()
    }
}

enum Outcome {
    Row(OptimizationRow),
    Failed,
    Cancelled,
}

/// Exhaustive search over `shorts` x `longs`.
///
/// `cancel` is a best-effort stop: units observing the flag raised are not
/// evaluated; already-finished units remain in the report.
pub fn optimize_ma_cross(
    series: &PriceSeries,
    shorts: &[usize],
    longs: &[usize],
    initial_capital: f64,
    cancel: Option<&AtomicBool>,
) -> Result<OptimizationReport, StratsimError> {
    if initial_capital <= 0.0 {
        return Err(StratsimError::InvalidParameter {
            name: "initial_capital".into(),
            reason: "must be positive".into(),
        });
    }

    let total = shorts.len() * longs.len();
    let combinations: Vec<(usize, usize)> = shorts
        .iter()
        .flat_map(|&s| longs.iter().map(move |&l| (s, l)))
        .filter(|&(s, l)| s < l)
        .collect();
    let skipped_constraint = total - combinations.len();

    let outcomes: Vec<Outcome> = combinations
        .par_iter()
        .map(|&(short, long)| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Outcome::Cancelled;
            }

            let spec = StrategySpec::MaCross { short, long };
            let result = spec
                .generate_signal(series)
                .and_then(|signals| run_simulation(&signals, initial_capital));

            match result {
                Ok(sim) => Outcome::Row(OptimizationRow {
                    short,
                    long,
                    total_return: sim.metrics.total_return,
                    max_drawdown: sim.metrics.max_drawdown,
                    win_rate: sim.metrics.win_rate,
                }),
                Err(_) => Outcome::Failed,
            }
        })
        .collect();

    let mut rows = Vec::new();
    let mut skipped_error = 0;
    let mut cancelled = false;
    for outcome in outcomes {
        match outcome {
            Outcome::Row(row) => rows.push(row),
            Outcome::Failed => skipped_error += 1,
            Outcome::Cancelled => cancelled = true,
        }
    }

    rows.sort_by(|a, b| {
        b.total_return
            .total_cmp(&a.total_return)
            .then(b.max_drawdown.total_cmp(&a.max_drawdown))
            .then(a.short.cmp(&b.short))
            .then(a.long.cmp(&b.long))
    });

    Ok(OptimizationReport {
        evaluated: rows.len(),
        rows,
        skipped_constraint,
        skipped_error,
        cancelled,
    })
}

/// Expand an inclusive `start..=end` range with a step into grid values.
pub fn axis_values(start: usize, end: usize, step: usize) -> Vec<usize> {
    if step == 0 || start > end {
        return Vec::new();
    }
    (start..=end).step_by(step).collect()
}
