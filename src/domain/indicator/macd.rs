//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal_period), seeded once the line itself is valid
//! histogram = line - signal
//!
//! Warmup: the line needs (slow-1) bars, the signal a further (signal-1),
//! so the first (slow + signal - 2) bars are invalid.

use crate::domain::indicator::ema::ema_over;
use crate::domain::indicator::{
    invalid_point, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd { fast, slow, signal };

    if fast == 0 || slow == 0 || signal == 0 || fast >= slow || bars.len() < slow {
        return IndicatorSeries {
            indicator_type,
            values: bars.iter().map(|b| invalid_point(b.date)).collect(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fast_ema = ema_over(&closes, fast);
    let slow_ema = ema_over(&closes, slow);

    // MACD line exists from index slow-1 onward.
    let line_start = slow - 1;
    let line: Vec<f64> = (line_start..bars.len())
        .map(|i| fast_ema[i].unwrap_or(0.0) - slow_ema[i].unwrap_or(0.0))
        .collect();
    let signal_line = ema_over(&line, signal);

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let point = if i < line_start {
            invalid_point(bar.date)
        } else {
            match signal_line[i - line_start] {
                Some(sig) => {
                    let l = line[i - line_start];
                    IndicatorPoint {
                        date: bar.date,
                        valid: true,
                        value: IndicatorValue::Macd {
                            line: l,
                            signal: sig,
                            histogram: l - sig,
                        },
                    }
                }
                None => invalid_point(bar.date),
            }
        };
        values.push(point);
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
