//! Candlestick pattern detection.
//!
//! Shape-only heuristics on single bars and bar pairs. No trend filter
//! is applied; placing a pattern in context is left to the caller.

use chrono::NaiveDate;

use crate::domain::ohlcv::{OhlcvBar, PriceSeries};

/// Body tolerance for a doji, as a fraction of the bar's full range.
const DOJI_BODY_MAX: f64 = 0.1;
/// Hammer: body at most this fraction of the range...
const HAMMER_BODY_MAX: f64 = 0.3;
/// ...with a lower shadow at least this multiple of the body...
const HAMMER_LOWER_MIN: f64 = 2.0;
/// ...and an upper shadow at most this multiple of the body.
const HAMMER_UPPER_MAX: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct PatternPoint {
    pub date: NaiveDate,
    pub doji: bool,
    pub hammer: bool,
    pub bullish_engulfing: bool,
}

impl PatternPoint {
    pub fn any(&self) -> bool {
        self.doji || self.hammer || self.bullish_engulfing
    }
}

fn body(bar: &OhlcvBar) -> f64 {
    (bar.close - bar.open).abs()
}

fn upper_shadow(bar: &OhlcvBar) -> f64 {
    bar.high - bar.open.max(bar.close)
}

fn lower_shadow(bar: &OhlcvBar) -> f64 {
    bar.open.min(bar.close) - bar.low
}

/// Small body relative to range. A zero-range bar (open=high=low=close)
/// counts: its body is zero too.
pub fn is_doji(bar: &OhlcvBar) -> bool {
    body(bar) <= (bar.high - bar.low) * DOJI_BODY_MAX
}

/// Small body near the top of the range with a long lower shadow.
pub fn is_hammer(bar: &OhlcvBar) -> bool {
    let body = body(bar);
    body <= (bar.high - bar.low) * HAMMER_BODY_MAX
        && lower_shadow(bar) >= body * HAMMER_LOWER_MIN
        && upper_shadow(bar) <= body * HAMMER_UPPER_MAX
}

/// Red bar followed by a green bar whose body covers the previous body.
pub fn is_bullish_engulfing(prev: &OhlcvBar, curr: &OhlcvBar) -> bool {
    prev.close < prev.open
        && curr.close > curr.open
        && curr.open <= prev.close
        && curr.close >= prev.open
}

/// One `PatternPoint` per bar. The first bar can never be a bullish
/// engulfing since it has no predecessor.
pub fn detect_patterns(series: &PriceSeries) -> Vec<PatternPoint> {
    let bars = series.bars();
    bars.iter()
        .enumerate()
        .map(|(i, bar)| PatternPoint {
            date: bar.date,
            doji: is_doji(bar),
            hammer: is_hammer(bar),
            bullish_engulfing: i > 0 && is_bullish_engulfing(&bars[i - 1], bar),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn doji_requires_tiny_body() {
        // Range 10, body 0.5: within the 10% tolerance.
        assert!(is_doji(&bar(100.0, 105.0, 95.0, 100.5)));
        // Body 2 on range 10: too large.
        assert!(!is_doji(&bar(100.0, 105.0, 95.0, 102.0)));
    }

    #[test]
    fn flat_bar_is_a_doji() {
        assert!(is_doji(&bar(100.0, 100.0, 100.0, 100.0)));
    }

    #[test]
    fn hammer_needs_long_lower_shadow_and_short_upper() {
        // Body 1 at the top, lower shadow 5, upper shadow 0.2.
        assert!(is_hammer(&bar(104.8, 106.0, 100.0, 105.8)));
        // Small body but lower shadow under 2x the body: rejected.
        assert!(!is_hammer(&bar(100.75, 101.35, 100.0, 101.15)));
        // Long upper shadow: rejected.
        assert!(!is_hammer(&bar(102.0, 106.0, 98.0, 103.0)));
    }

    #[test]
    fn engulfing_needs_red_then_covering_green() {
        let red = bar(105.0, 106.0, 99.0, 100.0);
        let green = bar(99.5, 107.0, 99.0, 106.0);
        assert!(is_bullish_engulfing(&red, &green));

        // Green bar that opens above the previous close does not engulf.
        let gap_up = bar(101.0, 107.0, 100.5, 106.0);
        assert!(!is_bullish_engulfing(&red, &gap_up));

        // Two green bars in a row are never an engulfing.
        assert!(!is_bullish_engulfing(&green, &green));
    }

    #[test]
    fn series_scan_marks_each_bar() {
        let bars = vec![
            OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                open: 105.0,
                high: 106.0,
                low: 99.0,
                close: 100.0,
                volume: 1000,
            },
            OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: 99.5,
                high: 107.0,
                low: 99.0,
                close: 106.0,
                volume: 1000,
            },
        ];
        let series = PriceSeries::new("TEST", bars).unwrap();
        let points = detect_patterns(&series);

        assert_eq!(points.len(), 2);
        assert!(!points[0].bullish_engulfing);
        assert!(points[1].bullish_engulfing);
        assert!(points[1].any());
    }
}
