//! Indicator layer — pure functions of the bar history.
//!
//! Each indicator takes the full bar series and produces a numeric series of
//! the same length, with the first `lookback()` values `f64::NAN` (warm-up).
//! Indicators are precomputed once before the bar walk and queried per bar
//! through `IndicatorValues`; a window is never computed from partial data.

pub mod atr;
pub mod obv;
pub mod sma;
pub mod trend_strength;

pub use atr::Atr;
pub use obv::{Obv, ObvMa};
pub use sma::Sma;
pub use trend_strength::TrendStrength;

use crate::domain::Bar;
use std::collections::HashMap;

/// Trait for indicators.
///
/// No value at bar t may depend on data from bar t+1 or later, and the first
/// `lookback()` outputs must be `f64::NAN`.
pub trait Indicator: Send + Sync {
    /// Series name used as the `IndicatorValues` key (e.g. "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars before the first defined output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Container for precomputed indicator series, keyed by indicator name.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Value of a named series at a bar index; `None` if the series is
    /// missing or the index is out of range.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Precompute a set of indicators over one symbol's bars.
pub fn precompute(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> IndicatorValues {
    let mut values = IndicatorValues::new();
    for indicator in indicators {
        let series = indicator.compute(bars);
        debug_assert_eq!(
            series.len(),
            bars.len(),
            "indicator '{}' produced {} values for {} bars",
            indicator.name(),
            series.len(),
            bars.len()
        );
        values.insert(indicator.name(), series);
    }
    values
}

/// Warm-up length for a set of indicators: the maximum lookback. The state
/// machine makes no decision before this index.
pub fn warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

/// Create synthetic bars from close prices for testing.
///
/// Open = previous close (or close for the first bar), high/low bracket the
/// open/close by 1.0, volume ramps so OBV moves are distinguishable.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: "TEST".to_string(),
                timestamp: base + Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0 + i as f64,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
