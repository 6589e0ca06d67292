//! SuperTrend indicator.
//!
//! Bands around the bar midpoint, offset by multiplier * ATR(period):
//! upper = (high+low)/2 + m*ATR, lower = (high+low)/2 - m*ATR. The trend
//! flag flips up when close breaks above the previous upper band and down
//! when it breaks below the previous lower band; otherwise it holds and the
//! active band ratchets (the lower band never falls while up, the upper
//! band never rises while down). The trend line is the active band.
//!
//! Direction seeds up at the first bar with a valid ATR.
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::{
    invalid_point, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_supertrend(bars: &[OhlcvBar], period: usize, multiplier: f64) -> IndicatorSeries {
    let indicator_type = IndicatorType::SuperTrend {
        period,
        multiplier_x100: (multiplier * 100.0).round() as u32,
    };

    let atr = calculate_atr(bars, period);
    if period == 0 || bars.len() < period {
        return IndicatorSeries {
            indicator_type,
            values: bars.iter().map(|b| invalid_point(b.date)).collect(),
        };
    }

    let start = period - 1;
    let mut values: Vec<IndicatorPoint> =
        bars[..start].iter().map(|b| invalid_point(b.date)).collect();

    let mut upper = 0.0;
    let mut lower = 0.0;
    let mut up = true;

    for (i, bar) in bars.iter().enumerate().skip(start) {
        let atr_value = match atr.values[i].value.as_simple() {
            Some(v) if atr.values[i].valid => v,
            _ => {
                values.push(invalid_point(bar.date));
                continue;
            }
        };

        let mid = (bar.high + bar.low) / 2.0;
        let basic_upper = mid + multiplier * atr_value;
        let basic_lower = mid - multiplier * atr_value;

        if i == start {
            upper = basic_upper;
            lower = basic_lower;
            up = true;
        } else if bar.close > upper {
            up = true;
            upper = basic_upper;
            lower = basic_lower;
        } else if bar.close < lower {
            up = false;
            upper = basic_upper;
            lower = basic_lower;
        } else {
            // Hold: ratchet the active band only.
            if up {
                lower = lower.max(basic_lower);
                upper = basic_upper;
            } else {
                upper = upper.min(basic_upper);
                lower = basic_lower;
            }
        }

        let line = if up { lower } else { upper };
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::SuperTrend { line, up },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
