//! Typst report generation.
//!
//! Reads a Typst template (the built-in default or a custom file),
//! resolves every `{{PLACEHOLDER}}` with markup from `tables` and
//! `chart_svg`, and writes the final `.typ` file. Compiling the file
//! to PDF is left to the typst CLI.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::StratsimError;
use crate::domain::simulation::SimulationResult;
use crate::domain::strategy::StrategySpec;
use crate::ports::report_port::ReportPort;

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub strategy: &'a StrategySpec,
    pub result: &'a SimulationResult,
    pub symbol: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    let mut output = template.to_string();

    let summary = tables::render_run_summary(
        ctx.strategy,
        ctx.symbol,
        ctx.start_date,
        ctx.end_date,
        ctx.result.initial_capital,
    );
    output = output.replace("{{RUN_SUMMARY}}", &summary);

    let metrics = tables::render_metrics_table(&ctx.result.metrics);
    output = output.replace("{{METRICS_TABLE}}", &metrics);

    let equity = chart_svg::format_equity_chart(&ctx.result.equity_curve);
    output = output.replace("{{EQUITY_CURVE}}", &equity);

    let drawdown = chart_svg::format_drawdown_chart(&ctx.result.equity_curve);
    output = output.replace("{{DRAWDOWN_CHART}}", &drawdown);

    let monthly = tables::render_monthly_returns(&ctx.result.equity_curve);
    output = output.replace("{{MONTHLY_RETURNS}}", &monthly);

    output
}

pub struct TypstReportAdapter {
    template_path: Option<PathBuf>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TypstReportAdapter {
    pub fn new(
        template_path: Option<PathBuf>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            template_path,
            start_date,
            end_date,
        }
    }

    fn load_template(&self) -> Result<String, StratsimError> {
        match &self.template_path {
            Some(path) => fs::read_to_string(path).map_err(StratsimError::Io),
            None => Ok(default_template::template().to_string()),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        result: &SimulationResult,
        strategy: &StrategySpec,
        symbol: &str,
        output_path: &str,
    ) -> Result<(), StratsimError> {
        let template = self.load_template()?;
        let ctx = ReportContext {
            strategy,
            result,
            symbol,
            start_date: self.start_date,
            end_date: self.end_date,
        };
        let markup = resolve(&template, &ctx);
        fs::write(output_path, markup).map_err(StratsimError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::PerformanceMetrics;
    use crate::domain::simulation::EquityPoint;
    use tempfile::TempDir;

    fn sample_result() -> SimulationResult {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        ];
        SimulationResult {
            initial_capital: 100_000.0,
            equity_curve: vec![
                EquityPoint {
                    date: dates[0],
                    equity: 100_000.0,
                    peak: 100_000.0,
                    drawdown: 0.0,
                },
                EquityPoint {
                    date: dates[1],
                    equity: 105_000.0,
                    peak: 105_000.0,
                    drawdown: 0.0,
                },
            ],
            returns: vec![0.0, 0.05],
            metrics: PerformanceMetrics {
                total_return: 0.05,
                max_drawdown: 0.0,
                win_rate: 1.0,
                final_value: 105_000.0,
            },
        }
    }

    fn sample_ctx<'a>(result: &'a SimulationResult, strategy: &'a StrategySpec) -> ReportContext<'a> {
        ReportContext {
            strategy,
            result,
            symbol: "BHP",
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }
    }

    #[test]
    fn resolve_default_template_no_placeholders_remain() {
        let result = sample_result();
        let strategy = StrategySpec::MaCross { short: 20, long: 50 };
        let output = resolve(default_template::template(), &sample_ctx(&result, &strategy));
        assert!(
            !output.contains("{{"),
            "unresolved placeholder in output: {output}"
        );
    }

    #[test]
    fn resolve_produces_valid_typst() {
        let result = sample_result();
        let strategy = StrategySpec::MaCross { short: 20, long: 50 };
        let output = resolve(default_template::template(), &sample_ctx(&result, &strategy));

        assert!(output.contains("#set page("));
        assert!(output.contains("= Backtest Report"));
        assert!(output.contains("#table("));
        assert!(output.contains("ma_cross(20,50)"));
        assert!(output.contains("5.00%"));
    }

    #[test]
    fn resolve_custom_template() {
        let result = sample_result();
        let strategy = StrategySpec::MaCross { short: 20, long: 50 };

        let custom = "= My Report\n{{RUN_SUMMARY}}\n{{METRICS_TABLE}}";
        let output = resolve(custom, &sample_ctx(&result, &strategy));
        assert!(output.contains("= My Report"));
        assert!(output.contains("#table("));
        assert!(!output.contains("{{"));
    }

    #[test]
    fn adapter_writes_typ_file() {
        let dir = TempDir::new().unwrap();
        let out_path = dir.path().join("report.typ");
        let adapter = TypstReportAdapter::new(
            None,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );

        let result = sample_result();
        let strategy = StrategySpec::MaCross { short: 20, long: 50 };
        adapter
            .write(&result, &strategy, "BHP", out_path.to_str().unwrap())
            .unwrap();

        let written = fs::read_to_string(&out_path).unwrap();
        assert!(written.contains("= Backtest Report"));
    }

    #[test]
    fn missing_custom_template_errors() {
        let adapter = TypstReportAdapter::new(
            Some(PathBuf::from("/nonexistent/template.typ")),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        let result = sample_result();
        let strategy = StrategySpec::MaCross { short: 20, long: 50 };
        assert!(adapter.write(&result, &strategy, "BHP", "/tmp/out.typ").is_err());
    }
}
