//! Trade statistics — pure functions that reduce a closed-trade list.
//!
//! Every metric is a pure function: trade list in, scalar out. No
//! dependencies on the runner, data loading, or the engine. Zero trades is
//! a valid, reportable outcome; degenerate statistics (zero variance, one
//! trade) yield a defined 0.0 sentinel, never NaN.

use serde::{Deserialize, Serialize};
use tidelab_core::domain::{ClosedTrade, Interval};

/// Below this many trades the statistics are flagged as unreliable —
/// reported anyway, never silently dropped.
pub const MIN_TRADES: usize = 5;

/// Aggregate statistics over one symbol's closed trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Compounded total return: Π(1 + r_i) − 1.
    pub total_return: f64,
    pub mean_return: f64,
    /// Sample standard deviation (N − 1) of per-trade returns.
    pub std_return: f64,
    /// mean/std × sqrt(bars per year). A per-trade approximation of a
    /// Sharpe ratio — it scales trade statistics as if they were per-bar,
    /// which overstates significance when trade frequency is low.
    pub sharpe: f64,
    pub win_rate: f64,
    /// Largest peak-to-trough drop of the compounded trade-by-trade equity
    /// curve, as a negative fraction.
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub low_sample: bool,
}

impl Summary {
    /// Reduce a trade list. An empty list produces the all-zero summary.
    pub fn compute(trades: &[ClosedTrade], interval: Interval) -> Self {
        let returns: Vec<f64> = trades.iter().map(|t| t.return_frac).collect();
        let mean = mean(&returns);
        let std = sample_std(&returns);
        let sharpe = if std < 1e-15 {
            0.0
        } else {
            (mean / std) * interval.bars_per_year().sqrt()
        };
        Self {
            total_return: total_return(&returns),
            mean_return: mean,
            std_return: std,
            sharpe,
            win_rate: win_rate(trades),
            max_drawdown: max_drawdown(&returns),
            trade_count: trades.len(),
            low_sample: trades.len() < MIN_TRADES,
        }
    }
}

/// Compounded total return over per-trade returns.
pub fn total_return(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// Fraction of trades with a strictly positive return.
pub fn win_rate(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

/// Maximum drawdown of the compounded trade-by-trade equity curve,
/// starting at 1.0, as a negative fraction of the running peak.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;
    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (equity - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tidelab_core::domain::{ExitReason, Side};

    fn make_trade(return_frac: f64) -> ClosedTrade {
        let t = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        ClosedTrade {
            symbol: "BTCUSDT".into(),
            side: Side::Long,
            entry_bar: 0,
            entry_time: t,
            entry_price: 100.0,
            exit_bar: 5,
            exit_time: t,
            exit_price: 100.0 * (1.0 + return_frac),
            return_frac,
            reason: ExitReason::SignalReversal,
            bars_held: 5,
        }
    }

    #[test]
    fn total_return_compounds() {
        // (1.1)(0.95)(1.02) - 1
        let r = total_return(&[0.1, -0.05, 0.02]);
        assert!((r - (1.1 * 0.95 * 1.02 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn total_return_empty_is_zero() {
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn total_return_matches_stepwise_equity() {
        let returns = [0.04, -0.02, 0.07, -0.01, 0.03, -0.06];
        let mut equity = 1.0;
        for r in returns {
            equity *= 1.0 + r;
        }
        assert!((total_return(&returns) - (equity - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn win_rate_mixed() {
        let trades = vec![
            make_trade(0.05),
            make_trade(-0.02),
            make_trade(0.03),
            make_trade(-0.01),
        ];
        assert!((win_rate(&trades) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn win_rate_zero_return_is_not_a_win() {
        let trades = vec![make_trade(0.0), make_trade(0.05)];
        assert!((win_rate(&trades) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_known_path() {
        // Equity: 1.1, 0.99, 1.04 → peak 1.1, trough 0.99.
        let dd = max_drawdown(&[0.1, -0.1, 0.05]);
        assert!((dd - (0.99 - 1.1) / 1.1).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_monotone_gain_is_zero() {
        assert_eq!(max_drawdown(&[0.01, 0.02, 0.03]), 0.0);
    }

    #[test]
    fn sample_std_known() {
        // Values 1,2,3,4: sample variance = 5/3.
        let s = sample_std(&[1.0, 2.0, 3.0, 4.0]);
        assert!((s - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_trade_yields_zero_ratio_not_nan() {
        let summary = Summary::compute(&[make_trade(0.05)], Interval::Hour4);
        assert_eq!(summary.sharpe, 0.0);
        assert_eq!(summary.std_return, 0.0);
        assert_eq!(summary.trade_count, 1);
        assert!(summary.low_sample);
        assert!(summary.total_return.is_finite());
    }

    #[test]
    fn constant_returns_yield_zero_ratio() {
        let trades: Vec<ClosedTrade> = (0..10).map(|_| make_trade(0.02)).collect();
        let summary = Summary::compute(&trades, Interval::Day1);
        assert_eq!(summary.sharpe, 0.0);
        assert!(!summary.low_sample);
    }

    #[test]
    fn zero_trades_is_the_all_zero_summary() {
        let summary = Summary::compute(&[], Interval::Hour1);
        assert_eq!(summary.trade_count, 0);
        assert_eq!(summary.total_return, 0.0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.sharpe, 0.0);
        assert!(summary.low_sample);
    }

    #[test]
    fn sharpe_scales_with_the_interval() {
        let trades: Vec<ClosedTrade> = [0.02, 0.01, 0.03, -0.01, 0.02, 0.015]
            .iter()
            .map(|&r| make_trade(r))
            .collect();
        let hourly = Summary::compute(&trades, Interval::Hour1);
        let daily = Summary::compute(&trades, Interval::Day1);
        // Same mean/std; only the annualization constant differs.
        let ratio = hourly.sharpe / daily.sharpe;
        let expected = (8760.0_f64 / 252.0).sqrt();
        assert!((ratio - expected).abs() < 1e-9);
    }
}
