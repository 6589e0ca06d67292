//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(close[i-n+1 ..= i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{
    invalid_point, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: bars.iter().map(|b| invalid_point(b.date)).collect(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut rolling_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        rolling_sum += bar.close;
        if i >= period {
            rolling_sum -= bars[i - period].close;
        }

        if i + 1 < period {
            values.push(invalid_point(bar.date));
        } else {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Simple(rolling_sum / period as f64),
            });
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
        assert_eq!(series.warmup_len(), 2);
    }

    #[test]
    fn sma_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 3);

        assert_eq!(series.values[2].value.as_simple(), Some(20.0));
        assert_eq!(series.values[3].value.as_simple(), Some(30.0));
    }

    #[test]
    fn sma_period_1_is_close() {
        let bars = make_bars(&[10.0, 11.0, 9.0, 12.0, 13.0]);
        let series = calculate_sma(&bars, 1);

        for (point, bar) in series.values.iter().zip(&bars) {
            assert!(point.valid);
            assert_eq!(point.value.as_simple(), Some(bar.close));
        }
    }

    #[test]
    fn sma_two_bar_average() {
        let bars = make_bars(&[10.0, 11.0, 9.0, 12.0, 13.0]);
        let series = calculate_sma(&bars, 2);

        assert!(!series.values[0].valid);
        assert_eq!(series.values[1].value.as_simple(), Some(10.5));
        assert_eq!(series.values[2].value.as_simple(), Some(10.0));
        assert_eq!(series.values[3].value.as_simple(), Some(10.5));
        assert_eq!(series.values[4].value.as_simple(), Some(12.5));
    }

    #[test]
    fn sma_period_0_all_invalid() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 0);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_empty_bars() {
        let series = calculate_sma(&[], 3);
        assert!(series.values.is_empty());
    }

    #[test]
    fn sma_period_longer_than_series() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 5);
        assert!(series.values.iter().all(|p| !p.valid));
    }
}
