//! Chart rendering for reports.
//!
//! Draws the equity curve and drawdown as inline Typst figures with a
//! simple scaled polyline. No external charting dependency.

use crate::domain::simulation::EquityPoint;

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 200.0;
const PADDING: f64 = 40.0;

fn format_line_chart(values: &[f64], caption: &str, stroke: &str) -> String {
    if values.is_empty() {
        return format!("No {} data available.", caption.to_lowercase());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if values.len() > 1 {
        plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - (value - min) * scale_y;
            format!("({:.1}pt, {:.1}pt)", x, y)
        })
        .collect();

    format!(
        r#"#figure(
  box(
    width: {:.0}pt,
    height: {:.0}pt,
    fill: white,
    {{
      place(line(start: ({:.0}pt, {:.0}pt), end: ({:.0}pt, {:.0}pt)))
      place(line(start: ({:.0}pt, {:.0}pt), end: ({:.0}pt, {:.0}pt)))
      place(path(
        fill: none,
        stroke: {} + 1pt,
        {}
      ))
    }}
  ),
  caption: [{}]
)
"#,
        WIDTH,
        HEIGHT,
        PADDING,
        PADDING,
        PADDING,
        HEIGHT - PADDING,
        PADDING,
        HEIGHT - PADDING,
        WIDTH - PADDING,
        HEIGHT - PADDING,
        stroke,
        points.join(",\n        "),
        caption
    )
}

pub fn format_equity_chart(equity_curve: &[EquityPoint]) -> String {
    let values: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
    format_line_chart(&values, "Equity Curve", "blue")
}

pub fn format_drawdown_chart(equity_curve: &[EquityPoint]) -> String {
    let values: Vec<f64> = equity_curve.iter().map(|p| p.drawdown).collect();
    format_line_chart(&values, "Drawdown", "red")
}
