//! OHLCV bar and validated price series.

use chrono::NaiveDate;

use crate::domain::error::StratsimError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// An immutable, date-ordered series of OHLCV bars for one symbol.
///
/// Invariants enforced at construction: dates strictly increasing (hence
/// unique), high >= open/close/low, low <= open/close. Stages downstream
/// never mutate a series; they return new bundles instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, StratsimError> {
        let symbol = symbol.into();

        for window in bars.windows(2) {
            if window[1].date <= window[0].date {
                return Err(StratsimError::MalformedSeries {
                    symbol,
                    reason: format!(
                        "dates not strictly increasing: {} then {}",
                        window[0].date, window[1].date
                    ),
                });
            }
        }

        for bar in &bars {
            let body_ok = bar.high >= bar.open
                && bar.high >= bar.close
                && bar.high >= bar.low
                && bar.low <= bar.open
                && bar.low <= bar.close;
            if !body_ok {
                return Err(StratsimError::MalformedSeries {
                    symbol,
                    reason: format!("OHLC envelope violated on {}", bar.date),
                });
            }
        }

        Ok(Self { symbol, bars })
    }

    /// An empty series; the documented "fetch failed" value of data providers.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
