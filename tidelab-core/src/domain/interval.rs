//! Bar sampling interval and its annualization constant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sampling interval of a bar series.
///
/// `bars_per_year()` feeds the Sharpe-like annualization in the metrics
/// layer. The constants are the ones the strategy variants were tuned with:
/// crypto intervals assume a 24/7 market (365 days), the 60-minute interval
/// assumes a 4-hour futures session over 252 trading days, and daily bars
/// assume 252 sessions. This is a documented approximation, not a true
/// per-trade annualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    /// 60-minute futures bars (4 bars per session, 252 sessions).
    Min60,
    /// Hourly crypto bars.
    Hour1,
    /// Four-hour crypto bars.
    Hour4,
    /// Daily bars.
    Day1,
}

impl Interval {
    pub fn bars_per_year(self) -> f64 {
        match self {
            Interval::Min60 => 252.0 * 4.0,
            Interval::Hour1 => 24.0 * 365.0,
            Interval::Hour4 => 6.0 * 365.0,
            Interval::Day1 => 252.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Min60 => "60m",
            Interval::Hour1 => "1h",
            Interval::Hour4 => "4h",
            Interval::Day1 => "1d",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "60m" => Ok(Interval::Min60),
            "1h" => Ok(Interval::Hour1),
            "4h" => Ok(Interval::Hour4),
            "1d" => Ok(Interval::Day1),
            other => Err(format!("unknown interval '{other}' (expected 60m, 1h, 4h, or 1d)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_per_year_constants() {
        assert_eq!(Interval::Min60.bars_per_year(), 1008.0);
        assert_eq!(Interval::Hour1.bars_per_year(), 8760.0);
        assert_eq!(Interval::Hour4.bars_per_year(), 2190.0);
        assert_eq!(Interval::Day1.bars_per_year(), 252.0);
    }

    #[test]
    fn parse_roundtrip() {
        for iv in [Interval::Min60, Interval::Hour1, Interval::Hour4, Interval::Day1] {
            assert_eq!(iv.as_str().parse::<Interval>().unwrap(), iv);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("5m".parse::<Interval>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Interval::Hour4).unwrap();
        assert_eq!(json, "\"hour4\"");
    }
}
