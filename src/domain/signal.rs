//! Signal series: per-bar stance and transitions.
//!
//! A `SignalSeries` is the date-aligned output of a strategy run over a
//! price series: for every bar, the close, the desired position state
//! (`Stance`) and the discrete change from the previous bar
//! (`transition`: +1 enter, -1 exit, 0 hold; the first bar is always 0).
//! It also carries the indicator columns that produced the stances, for
//! the reporting layer. Built fresh per call; the input series is never
//! mutated.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

/// Desired position state for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Flat,
    Invested,
}

impl Stance {
    /// 1.0 when invested, 0.0 when flat; the exposure factor the
    /// simulation multiplies market returns by.
    pub fn factor(self) -> f64 {
        match self {
            Stance::Flat => 0.0,
            Stance::Invested => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub stance: Stance,
    /// +1 enter, -1 exit, 0 unchanged. Always 0 on the first bar.
    pub transition: i8,
}

#[derive(Debug, Clone)]
pub struct SignalSeries {
    symbol: String,
    points: Vec<SignalPoint>,
    indicators: HashMap<IndicatorType, IndicatorSeries>,
}

impl SignalSeries {
    /// Assemble from per-bar stances. `stances` must be date-aligned with
    /// `series` (one entry per bar).
    pub fn from_stances(
        series: &PriceSeries,
        stances: Vec<Stance>,
        indicators: HashMap<IndicatorType, IndicatorSeries>,
    ) -> Self {
        assert_eq!(
            series.len(),
            stances.len(),
            "stance vector must align with price series"
        );

        let mut points = Vec::with_capacity(series.len());
        let mut prev = Stance::Flat;
        for (i, (bar, stance)) in series.bars().iter().zip(stances).enumerate() {
            let transition = if i == 0 {
                0
            } else {
                (stance.factor() - prev.factor()) as i8
            };
            points.push(SignalPoint {
                date: bar.date,
                close: bar.close,
                stance,
                transition,
            });
            prev = stance;
        }

        Self {
            symbol: series.symbol().to_string(),
            points,
            indicators,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[SignalPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn indicator(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.indicators.get(indicator_type)
    }

    pub fn indicators(&self) -> &HashMap<IndicatorType, IndicatorSeries> {
        &self.indicators
    }
}
