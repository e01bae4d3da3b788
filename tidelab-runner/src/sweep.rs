//! Parameter grid sweep.
//!
//! The bar walk is a deterministic fold with no shared mutable state, so
//! the sweep is embarrassingly parallel: rayon over the generated grid,
//! one independent backtest per parameter combination, ranked by the
//! Sharpe-like ratio.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tidelab_core::domain::{Bar, Interval};
use tidelab_core::strategy::StrategyParams;

use crate::metrics::Summary;
use crate::runner::run_symbol;

/// Ranges to sweep over. Each combination is applied on top of a base
/// configuration; invalid combinations (e.g. fast >= slow) are skipped at
/// generation time rather than erroring mid-sweep.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub base: StrategyParams,
    pub ma_fast: Vec<usize>,
    pub ma_slow: Vec<usize>,
    pub stop_loss: Vec<Option<f64>>,
    pub trailing_stop: Vec<Option<f64>>,
}

impl ParamGrid {
    /// The default crossover grid used by the sweep subcommand.
    pub fn crossover_default(base: StrategyParams) -> Self {
        Self {
            base,
            ma_fast: vec![3, 5, 8, 10],
            ma_slow: vec![15, 20, 30, 40],
            stop_loss: vec![Some(0.02), Some(0.03), Some(0.05)],
            trailing_stop: vec![None, Some(0.03)],
        }
    }

    /// Upper bound on the grid size before invalid combinations are
    /// dropped.
    pub fn size(&self) -> usize {
        self.ma_fast.len() * self.ma_slow.len() * self.stop_loss.len() * self.trailing_stop.len()
    }

    /// Every valid parameter combination in the grid.
    pub fn generate(&self) -> Vec<StrategyParams> {
        let mut params = Vec::with_capacity(self.size());
        for &fast in &self.ma_fast {
            for &slow in &self.ma_slow {
                for &stop in &self.stop_loss {
                    for &trail in &self.trailing_stop {
                        let candidate = StrategyParams {
                            ma_fast: fast,
                            ma_slow: slow,
                            stop_loss: stop,
                            trailing_stop: trail,
                            ..self.base.clone()
                        };
                        if candidate.validate().is_ok() {
                            params.push(candidate);
                        }
                    }
                }
            }
        }
        params
    }
}

/// One sweep result: the combination and its summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEntry {
    pub params: StrategyParams,
    pub summary: Summary,
}

/// Run every grid combination over the same bars, ranked best-first by the
/// Sharpe-like ratio (total return as the tie-break).
pub fn sweep(bars: &[Bar], grid: &ParamGrid, interval: Interval) -> Vec<SweepEntry> {
    let mut entries: Vec<SweepEntry> = grid
        .generate()
        .into_par_iter()
        .map(|params| {
            // generate() only emits validated combinations.
            let report = run_symbol(bars, &params, interval)
                .expect("validated params failed to compile");
            SweepEntry {
                params,
                summary: report.summary,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        (b.summary.sharpe, b.summary.total_return)
            .partial_cmp(&(a.summary.sharpe, a.summary.total_return))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries
}
