//! Table formatting for reports.
//!
//! Typst markup generators for the run summary, the metrics table and
//! the monthly returns heatmap.

use crate::domain::metrics::PerformanceMetrics;
use crate::domain::simulation::EquityPoint;
use crate::domain::strategy::StrategySpec;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

pub fn render_run_summary(
    strategy: &StrategySpec,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    initial_capital: f64,
) -> String {
    let mut out = String::from("#table(\n  columns: 2,\n");
    out.push_str(&format!("  [*Symbol*], [{}],\n", symbol));
    out.push_str(&format!("  [*Strategy*], [{}],\n", strategy));
    out.push_str(&format!("  [*Start Date*], [{}],\n", start_date));
    out.push_str(&format!("  [*End Date*], [{}],\n", end_date));
    out.push_str(&format!(
        "  [*Initial Capital*], [{}],\n",
        fmt_currency(initial_capital)
    ));
    out.push_str(")\n");
    out
}

pub fn render_metrics_table(metrics: &PerformanceMetrics) -> String {
    let mut out = String::from("#table(\n  columns: 2,\n");
    out.push_str(&format!(
        "  [*Total Return*], [{}],\n",
        fmt_pct(metrics.total_return)
    ));
    out.push_str(&format!(
        "  [*Max Drawdown*], [{}],\n",
        fmt_pct(metrics.max_drawdown)
    ));
    out.push_str(&format!(
        "  [*Win Rate*], [{}],\n",
        fmt_pct(metrics.win_rate)
    ));
    out.push_str(&format!(
        "  [*Final Value*], [{}],\n",
        fmt_currency(metrics.final_value)
    ));
    out.push_str(")\n");
    out
}

pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub return_pct: f64,
}

/// Month-over-month return from each month's closing equity. The first
/// month has no prior reference and reports zero.
pub fn compute_monthly_returns(equity_curve: &[EquityPoint]) -> Vec<MonthlyReturn> {
    let mut month_end: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for point in equity_curve {
        month_end.insert((point.date.year(), point.date.month()), point.equity);
    }

    let mut returns = Vec::new();
    let mut prev: Option<f64> = None;
    for (&(year, month), &equity) in &month_end {
        let return_pct = match prev {
            Some(p) if p > 0.0 => (equity - p) / p,
            _ => 0.0,
        };
        returns.push(MonthlyReturn {
            year,
            month,
            return_pct,
        });
        prev = Some(equity);
    }
    returns
}

pub fn render_monthly_returns(equity_curve: &[EquityPoint]) -> String {
    let returns = compute_monthly_returns(equity_curve);
    if returns.is_empty() {
        return "_Insufficient data for monthly returns._\n".to_string();
    }

    let mut years: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
    for r in &returns {
        let entry = years.entry(r.year).or_insert([None; 12]);
        entry[(r.month - 1) as usize] = Some(r.return_pct);
    }

    let mut out = String::from("#table(\n  columns: 14,\n");
    out.push_str("  [*Year*], [*Jan*], [*Feb*], [*Mar*], [*Apr*], [*May*], [*Jun*], ");
    out.push_str("[*Jul*], [*Aug*], [*Sep*], [*Oct*], [*Nov*], [*Dec*], [*YTD*],\n");

    for (year, monthly) in &years {
        out.push_str(&format!("  [{}],", year));
        let mut ytd = 1.0_f64;
        for &cell in monthly.iter() {
            match cell {
                Some(ret) => {
                    ytd *= 1.0 + ret;
                    out.push_str(&format!(" {},", heatmap_cell(ret)));
                }
                None => out.push_str(" [-],"),
            }
        }
        out.push_str(&format!(" {},\n", heatmap_cell(ytd - 1.0)));
    }

    out.push_str(")\n");
    out
}

/// Fill color and white-text flag for a heatmap cell.
fn return_color(ret: f64) -> (&'static str, bool) {
    if ret >= 0.10 {
        ("rgb(\"#006400\")", true)
    } else if ret >= 0.02 {
        ("rgb(\"#90EE90\")", false)
    } else if ret > 0.0 {
        ("rgb(\"#E0FFE0\")", false)
    } else if ret == 0.0 {
        ("rgb(\"#FFFFFF\")", false)
    } else if ret > -0.02 {
        ("rgb(\"#FFE0E0\")", false)
    } else if ret > -0.10 {
        ("rgb(\"#FF9090\")", false)
    } else {
        ("rgb(\"#8B0000\")", true)
    }
}

fn heatmap_cell(ret: f64) -> String {
    let (color, white_text) = return_color(ret);
    let formatted = format!("{:+.1}%", ret * 100.0);
    if white_text {
        format!("box(fill: {}, text(fill: white, [{}]))", color, formatted)
    } else {
        format!("box(fill: {}, [{}])", color, formatted)
    }
}

fn fmt_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn fmt_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("${:.2}", value)
    } else {
        format!("-${:.2}", value.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: i32, month: u32, day: u32, equity: f64) -> EquityPoint {
        EquityPoint {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            equity,
            peak: equity,
            drawdown: 0.0,
        }
    }

    #[test]
    fn run_summary_lists_parameters() {
        let summary = render_run_summary(
            &StrategySpec::MaCross { short: 20, long: 50 },
            "BHP",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            100_000.0,
        );
        assert!(summary.contains("#table("));
        assert!(summary.contains("BHP"));
        assert!(summary.contains("ma_cross(20,50)"));
        assert!(summary.contains("$100000.00"));
    }

    #[test]
    fn metrics_table_formats_percentages() {
        let metrics = PerformanceMetrics {
            total_return: 0.25,
            max_drawdown: -0.15,
            win_rate: 0.60,
            final_value: 125_000.0,
        };
        let table = render_metrics_table(&metrics);
        assert!(table.contains("25.00%"));
        assert!(table.contains("-15.00%"));
        assert!(table.contains("$125000.00"));
    }

    #[test]
    fn monthly_returns_use_month_end_equity() {
        let curve = vec![
            point(2024, 1, 15, 100_000.0),
            point(2024, 1, 31, 102_000.0),
            point(2024, 2, 15, 101_000.0),
            point(2024, 2, 29, 104_040.0),
        ];
        let returns = compute_monthly_returns(&curve);

        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0].return_pct, 0.0);
        assert!((returns[1].return_pct - 0.02).abs() < 1e-9);
    }

    #[test]
    fn empty_curve_renders_fallback() {
        assert!(render_monthly_returns(&[]).contains("Insufficient data"));
    }

    #[test]
    fn heatmap_has_header_and_year_row() {
        let curve = vec![point(2024, 1, 31, 102_000.0), point(2024, 2, 29, 99_000.0)];
        let table = render_monthly_returns(&curve);
        assert!(table.contains("[*Jan*]"));
        assert!(table.contains("[2024],"));
        assert!(table.contains("[*YTD*]"));
    }
}
