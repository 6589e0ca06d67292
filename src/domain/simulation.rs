//! Backtest simulation: stance sequence + closes → equity curve.
//!
//! Execution rule (no look-ahead): the strategy return on bar t is the
//! market return of bar t times the stance in force *entering* bar t,
//! i.e. the stance decided on bar t-1. A bar's freshly computed stance
//! never earns that same bar's return.

use chrono::NaiveDate;

use crate::domain::error::StratsimError;
use crate::domain::metrics::PerformanceMetrics;
use crate::domain::signal::SignalSeries;

/// Minimum bars to compute a single market return.
pub const MIN_SIMULATION_BARS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    /// Running maximum of equity up to and including this bar.
    pub peak: f64,
    /// (equity - peak) / peak, always <= 0.
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub initial_capital: f64,
    pub equity_curve: Vec<EquityPoint>,
    /// Per-bar strategy return; index-aligned with the equity curve.
    /// The first bar has no prior close and earns 0.
    pub returns: Vec<f64>,
    pub metrics: PerformanceMetrics,
}

/// Run the simulation. Deterministic and idempotent: identical inputs
/// yield bit-identical output.
pub fn run_simulation(
    signals: &SignalSeries,
    initial_capital: f64,
) -> Result<SimulationResult, StratsimError> {
    if initial_capital <= 0.0 {
        return Err(StratsimError::InvalidParameter {
            name: "initial_capital".into(),
            reason: "must be positive".into(),
        });
    }

    let points = signals.points();
    if points.len() < MIN_SIMULATION_BARS {
        return Err(StratsimError::InsufficientData {
            symbol: signals.symbol().to_string(),
            bars: points.len(),
            minimum: MIN_SIMULATION_BARS,
        });
    }

    let mut equity_curve = Vec::with_capacity(points.len());
    let mut returns = Vec::with_capacity(points.len());
    let mut equity = initial_capital;
    let mut peak = initial_capital;

    for (i, point) in points.iter().enumerate() {
        let strategy_return = if i == 0 {
            0.0
        } else {
            let prev = &points[i - 1];
            let market_return = point.close / prev.close - 1.0;
            market_return * prev.stance.factor()
        };

        equity *= 1.0 + strategy_return;
        if equity > peak {
            peak = equity;
        }
        let drawdown = (equity - peak) / peak;

        returns.push(strategy_return);
        equity_curve.push(EquityPoint {
            date: point.date,
            equity,
            peak,
            drawdown,
        });
    }

    let metrics = PerformanceMetrics::compute(initial_capital, &equity_curve, &returns);

    Ok(SimulationResult {
        initial_capital,
        equity_curve,
        returns,
        metrics,
    })
}
