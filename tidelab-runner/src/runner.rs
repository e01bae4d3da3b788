//! Backtest orchestration: one symbol, or a capital-weighted portfolio.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tidelab_core::domain::{Bar, ClosedTrade, Interval, Position};
use tidelab_core::engine::run_backtest;
use tidelab_core::strategy::{ParamError, StrategyParams};

use crate::config::{RunConfig, RunId, SymbolSpec};
use crate::data_loader::{load_bars_csv, LoadError};
use crate::metrics::Summary;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Params(#[from] ParamError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Everything a single symbol's backtest produced, serializable as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub interval: Interval,
    pub params: StrategyParams,
    pub summary: Summary,
    pub trades: Vec<ClosedTrade>,
    pub bars: usize,
    pub warmup: usize,
    pub open_position: Option<Position>,
}

/// Per-symbol reports combined by fixed capital weight. The combination is
/// a weighted average of compounded returns — no correlation modeling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub run_id: RunId,
    pub interval: Interval,
    pub weighted_return: f64,
    pub trade_count: usize,
    pub reports: Vec<BacktestReport>,
}

/// Backtest one symbol's bars and summarize.
pub fn run_symbol(
    bars: &[Bar],
    params: &StrategyParams,
    interval: Interval,
) -> Result<BacktestReport, ParamError> {
    let result = run_backtest(bars, params)?;
    let summary = Summary::compute(&result.trades, interval);
    Ok(BacktestReport {
        symbol: result.symbol,
        interval,
        params: params.clone(),
        summary,
        trades: result.trades,
        bars: result.bars,
        warmup: result.warmup,
        open_position: result.open_position,
    })
}

/// Load every configured symbol's CSV and run the weighted portfolio.
pub fn run_config(config: &RunConfig, data_dir: &Path) -> Result<PortfolioReport, RunnerError> {
    let mut loaded = Vec::with_capacity(config.symbols.len());
    for spec in &config.symbols {
        let bars = load_bars_csv(&spec.csv_path(data_dir), &spec.symbol)?;
        loaded.push((spec.clone(), bars));
    }
    let report = run_portfolio(&loaded, &config.strategy, config.interval)?;
    Ok(PortfolioReport {
        run_id: config.run_id(),
        ..report
    })
}

/// Run each symbol independently and combine by capital weight.
pub fn run_portfolio(
    runs: &[(SymbolSpec, Vec<Bar>)],
    params: &StrategyParams,
    interval: Interval,
) -> Result<PortfolioReport, ParamError> {
    let mut reports = Vec::with_capacity(runs.len());
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (spec, bars) in runs {
        let mut report = run_symbol(bars, params, interval)?;
        // Bars carry the configured symbol even if the CSV lacked one.
        report.symbol = spec.symbol.clone();
        weighted += spec.weight * report.summary.total_return;
        total_weight += spec.weight;
        reports.push(report);
    }
    let weighted_return = if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    };
    Ok(PortfolioReport {
        run_id: RunId::new(),
        interval,
        weighted_return,
        trade_count: reports.iter().map(|r| r.trades.len()).sum(),
        reports,
    })
}
