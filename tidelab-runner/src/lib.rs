//! Tidelab Runner — everything around the engine: loading bars from CSV,
//! turning closed trades into summary statistics, running one symbol or a
//! weighted portfolio, sweeping parameter grids in parallel, and writing
//! JSON/Markdown reports.

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, RunConfig, RunId, SymbolSpec};
pub use data_loader::{load_bars_csv, LoadError};
pub use metrics::Summary;
pub use report::{markdown_summary, write_json_report, write_markdown_report, write_sweep_json};
pub use runner::{
    run_config, run_portfolio, run_symbol, BacktestReport, PortfolioReport, RunnerError,
};
pub use sweep::{sweep, ParamGrid, SweepEntry};
