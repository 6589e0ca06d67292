//! Report generation port trait.

use crate::domain::error::StratsimError;
use crate::domain::simulation::SimulationResult;
use crate::domain::strategy::StrategySpec;

/// Port for writing backtest reports. The core hands over plain series
/// and named metrics; rendering decisions live entirely in the adapter.
pub trait ReportPort {
    fn write(
        &self,
        result: &SimulationResult,
        strategy: &StrategySpec,
        symbol: &str,
        output_path: &str,
    ) -> Result<(), StratsimError>;
}
