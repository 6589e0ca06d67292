//! Performance metrics derived from an equity curve and per-bar returns.

use crate::domain::simulation::EquityPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    /// final_equity / initial_capital - 1
    pub total_return: f64,
    /// Most negative drawdown observed, <= 0.
    pub max_drawdown: f64,
    /// Winning bars / bars with nonzero return; 0 when no bar moved.
    pub win_rate: f64,
    pub final_value: f64,
}

impl PerformanceMetrics {
    pub fn compute(
        initial_capital: f64,
        equity_curve: &[EquityPoint],
        returns: &[f64],
    ) -> Self {
        let final_value = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            final_value / initial_capital - 1.0
        } else {
            0.0
        };

        let max_drawdown = equity_curve
            .iter()
            .map(|p| p.drawdown)
            .fold(0.0_f64, f64::min);

        let winning_bars = returns.iter().filter(|&&r| r > 0.0).count();
        let active_bars = returns.iter().filter(|&&r| r != 0.0).count();
        let win_rate = if active_bars > 0 {
            winning_bars as f64 / active_bars as f64
        } else {
            0.0
        };

        PerformanceMetrics {
            total_return,
            max_drawdown,
            win_rate,
            final_value,
        }
    }
}
