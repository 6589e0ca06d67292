//! Built-in Typst report template.

/// Default report markup. Placeholders are resolved by the module root.
pub fn template() -> &'static str {
    r#"#set page(paper: "a4", margin: 2cm)
#set text(font: "New Computer Modern", size: 10pt)

= Backtest Report

== Run Summary

{{RUN_SUMMARY}}

== Performance Metrics

{{METRICS_TABLE}}

== Equity Curve

{{EQUITY_CURVE}}

== Drawdown

{{DRAWDOWN_CHART}}

== Monthly Returns

{{MONTHLY_RETURNS}}
"#
}
