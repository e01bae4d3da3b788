//! Report writers: a JSON artifact with the full trade list, and a
//! Markdown summary table for humans.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::runner::{BacktestReport, PortfolioReport};
use crate::sweep::SweepEntry;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the full portfolio report (summaries, parameters, every closed
/// trade) as pretty-printed JSON.
pub fn write_json_report(report: &PortfolioReport, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Write the top sweep entries as pretty-printed JSON.
pub fn write_sweep_json(entries: &[SweepEntry], path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Render the per-symbol summary table as Markdown.
pub fn markdown_summary(report: &PortfolioReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Backtest report");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Run id: `{}`", report.run_id);
    let _ = writeln!(out, "- Interval: {}", report.interval);
    let _ = writeln!(
        out,
        "- Weighted return: {:.2}%",
        report.weighted_return * 100.0
    );
    let _ = writeln!(out, "- Trades: {}", report.trade_count);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "| Symbol | Trades | Total return | Win rate | Sharpe | Max DD | Flags |"
    );
    let _ = writeln!(out, "|---|---|---|---|---|---|---|");
    for r in &report.reports {
        let _ = writeln!(out, "{}", summary_row(r));
    }
    out
}

fn summary_row(r: &BacktestReport) -> String {
    let flags = if r.summary.low_sample { "low sample" } else { "" };
    format!(
        "| {} | {} | {:.2}% | {:.1}% | {:.2} | {:.2}% | {} |",
        r.symbol,
        r.summary.trade_count,
        r.summary.total_return * 100.0,
        r.summary.win_rate * 100.0,
        r.summary.sharpe,
        r.summary.max_drawdown * 100.0,
        flags,
    )
}

/// Write the Markdown summary to a file.
pub fn write_markdown_report(report: &PortfolioReport, path: &Path) -> Result<(), ReportError> {
    fs::write(path, markdown_summary(report)).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}
