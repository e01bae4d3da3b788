//! The bar walk: a deterministic fold over an in-memory bar sequence.
//!
//! Per bar, in fixed order: (1) if positioned, advance the trailing extreme
//! and evaluate exits — a firing exit closes the position on this bar with
//! no re-entry in the same step; (2) if still flat, evaluate the entry
//! conjunction. No decision is evaluated before every required indicator
//! window is fully populated, and a bar with any undefined required value
//! is skipped entirely.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, ClosedTrade, Position};
use crate::indicators;
use crate::strategy::{ParamError, StrategyParams, StrategyRules};

use super::executor::{Executor, IntentRecorder, OrderIntent, TradeRecorder};

/// Outcome of one backtest over one symbol's bars.
///
/// Zero closed trades is a valid, reportable outcome, not a fault. A
/// position still open when the data ends is surfaced separately and never
/// counted as a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub symbol: String,
    pub trades: Vec<ClosedTrade>,
    pub bars: usize,
    pub warmup: usize,
    pub open_position: Option<Position>,
}

/// Walk the bars, feeding every transition to the executor. Returns the
/// position still open at the end of the data, if any.
pub fn walk<E: Executor>(bars: &[Bar], rules: &StrategyRules, executor: &mut E) -> Option<Position> {
    let indicator_set = rules.indicator_set();
    let values = indicators::precompute(bars, &indicator_set);
    let start = rules.warmup();
    let symbol = bars.first().map(|b| b.symbol.clone()).unwrap_or_default();

    let mut position: Option<Position> = None;
    for (i, bar) in bars.iter().enumerate().skip(start) {
        let snap = rules.snapshot(&values, bar, i);
        if !rules.ready(&snap) {
            continue;
        }

        if let Some(mut pos) = position.take() {
            pos.bars_held += 1;
            pos.update_extreme(bar);
            match rules.first_exit(&snap, &pos) {
                Some(reason) => executor.on_exit(&symbol, &pos, bar, i, reason),
                None => position = Some(pos),
            }
            continue;
        }

        if let Some(side) = rules.entry_side(&snap) {
            let pos = Position::open(side, bar, i);
            executor.on_entry(&symbol, side, bar, i);
            position = Some(pos);
        }
    }
    position
}

/// Compile the configuration and run a full backtest over the bars.
pub fn run_backtest(bars: &[Bar], params: &StrategyParams) -> Result<RunResult, ParamError> {
    let rules = params.compile()?;
    let mut recorder = TradeRecorder::new();
    let open_position = walk(bars, &rules, &mut recorder);
    Ok(RunResult {
        symbol: bars.first().map(|b| b.symbol.clone()).unwrap_or_default(),
        bars: bars.len(),
        warmup: rules.warmup(),
        trades: recorder.into_trades(),
        open_position,
    })
}

/// Replay the walk as order intents: every entry becomes a market order
/// (plus a protective stop when one is configured) and every exit a closing
/// market order, sized at `quantity`.
pub fn scan_intents(
    bars: &[Bar],
    params: &StrategyParams,
    quantity: f64,
) -> Result<Vec<OrderIntent>, ParamError> {
    let rules = params.compile()?;
    let mut recorder = IntentRecorder::new(quantity, params.stop_loss);
    walk(bars, &rules, &mut recorder);
    Ok(recorder.into_intents())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExitReason;
    use crate::indicators::make_bars;

    fn cross_params() -> StrategyParams {
        StrategyParams {
            ma_fast: 2,
            ma_slow: 3,
            ma_trend: None,
            exit_on_reversal: false,
            stop_loss: Some(0.03),
            take_profit: None,
            ..Default::default()
        }
    }

    #[test]
    fn stop_loss_closes_the_drop() {
        let bars = make_bars(&[100.0, 102.0, 105.0, 103.0, 98.0, 95.0]);
        let result = run_backtest(&bars, &cross_params()).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_bar, 2);
        assert_eq!(trade.entry_price, 105.0);
        assert_eq!(trade.exit_bar, 4);
        assert_eq!(trade.exit_price, 98.0);
        assert_eq!(trade.reason, ExitReason::StopLoss);
        assert!((trade.return_frac - (98.0 - 105.0) / 105.0).abs() < 1e-12);
        assert!(result.open_position.is_none());
    }

    #[test]
    fn no_decision_before_warmup() {
        // Rising closes would trigger entry from the start if the short
        // windows were computed from partial data.
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let params = StrategyParams {
            ma_fast: 2,
            ma_slow: 4,
            ma_trend: None,
            exit_on_reversal: false,
            stop_loss: None,
            take_profit: None,
            ..Default::default()
        };
        let result = run_backtest(&bars, &params).unwrap();
        // Entry can fire at index 3 at the earliest (slow MA lookback).
        assert_eq!(result.warmup, 3);
        let open = result.open_position.expect("uptrend entry");
        assert_eq!(open.entry_bar, 3);
    }

    #[test]
    fn no_re_entry_on_exit_bar() {
        // Take-profit fires at i=4 while the MA alignment still holds on
        // that same bar; re-entry must wait for the next bar.
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 110.0, 111.0, 112.0]);
        let params = StrategyParams {
            take_profit: Some(crate::strategy::TakeProfit::FixedPct { pct: 0.05 }),
            stop_loss: None,
            ..cross_params()
        };
        let result = run_backtest(&bars, &params).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_bar, 2);
        assert_eq!(result.trades[0].exit_bar, 4);
        assert_eq!(result.trades[0].reason, ExitReason::TakeProfit);
        let open = result.open_position.expect("re-entry on the next bar");
        assert_eq!(open.entry_bar, 5);
    }

    #[test]
    fn all_flat_run_yields_zero_trades() {
        // Monotonically falling closes: fast MA stays below slow MA, so a
        // long-only configuration never enters.
        let closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        let result = run_backtest(&make_bars(&closes), &cross_params()).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.open_position.is_none());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let result = run_backtest(&[], &cross_params()).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.bars, 0);
    }

    #[test]
    fn intents_mirror_the_trade_sequence() {
        let bars = make_bars(&[100.0, 102.0, 105.0, 103.0, 98.0, 95.0]);
        let intents = scan_intents(&bars, &cross_params(), 0.5).unwrap();
        // Entry market + protective stop + closing market.
        assert_eq!(intents.len(), 3);
        assert!(intents.iter().all(|i| i.quantity == 0.5));
    }
}
