//! On-Balance Volume (OBV) and its moving average.
//!
//! OBV is a cumulative running sum starting at 0: volume is added on an
//! up-close, subtracted on a down-close, and carried unchanged when the
//! close is flat. The "energy confirmation" entry filters compare OBV
//! against an SMA of the OBV series itself.

use super::sma::sma_series;
use super::Indicator;
use crate::domain::Bar;

/// Raw cumulative OBV series. OBV[0] = 0 by definition, so there is no
/// warm-up beyond the first bar.
#[derive(Debug, Clone)]
pub struct Obv;

/// Compute the OBV series for a bar sequence.
///
/// A NaN close or volume poisons the remainder of the series — a cumulative
/// sum has no way to recover once an increment is undefined.
pub fn obv_series(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 {
        return result;
    }

    result[0] = 0.0;
    let mut running = 0.0_f64;
    for i in 1..n {
        let close = bars[i].close;
        let prev_close = bars[i - 1].close;
        let volume = bars[i].volume;
        if close.is_nan() || prev_close.is_nan() || volume.is_nan() || running.is_nan() {
            running = f64::NAN;
        } else if close > prev_close {
            running += volume;
        } else if close < prev_close {
            running -= volume;
        }
        result[i] = running;
    }
    result
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        "obv"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        obv_series(bars)
    }
}

/// Simple moving average of the OBV series.
#[derive(Debug, Clone)]
pub struct ObvMa {
    period: usize,
    name: String,
}

impl ObvMa {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "OBV MA period must be >= 1");
        Self {
            period,
            name: format!("obv_ma_{period}"),
        }
    }
}

impl Indicator for ObvMa {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        sma_series(&obv_series(bars), self.period)
    }
}
