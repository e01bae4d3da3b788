//! Trend strength — distance of price from the trend MA in ATR units.
//!
//! strength = |close - trend_MA| / ATR. A zero ATR yields 0.0 ("ranging, no
//! signal"), never a division fault or infinity.

use super::atr::true_range;
use super::sma::sma_series;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct TrendStrength {
    trend_period: usize,
    atr_period: usize,
    name: String,
}

impl TrendStrength {
    pub fn new(trend_period: usize, atr_period: usize) -> Self {
        assert!(trend_period >= 1, "trend period must be >= 1");
        assert!(atr_period >= 1, "ATR period must be >= 1");
        Self {
            trend_period,
            atr_period,
            name: format!("trend_strength_{trend_period}_{atr_period}"),
        }
    }
}

impl Indicator for TrendStrength {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        (self.trend_period - 1).max(self.atr_period)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let trend_ma = sma_series(&closes, self.trend_period);
        let atr = sma_series(&true_range(bars), self.atr_period);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let ma = trend_ma[i];
                let a = atr[i];
                if bar.close.is_nan() || ma.is_nan() || a.is_nan() {
                    f64::NAN
                } else if a == 0.0 {
                    0.0
                } else {
                    (bar.close - ma).abs() / a
                }
            })
            .collect()
    }
}
