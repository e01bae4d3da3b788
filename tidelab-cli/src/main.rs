//! Tidelab CLI — backtest, sweep, and signal commands.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config file, write JSON/Markdown reports
//! - `sweep` — grid-search strategy parameters over one symbol's bars
//! - `signal` — walk a bar file and print the order intents a live adapter would submit

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tidelab_core::domain::Interval;
use tidelab_core::engine::scan_intents;
use tidelab_core::strategy::StrategyParams;
use tidelab_runner::{
    load_bars_csv, markdown_summary, run_config, sweep, write_json_report, write_markdown_report,
    write_sweep_json, ParamGrid, RunConfig,
};

#[derive(Parser)]
#[command(name = "tidelab", about = "Tidelab — MA/OBV/ATR strategy backtesting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Directory containing the per-symbol CSV bar files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output directory for the JSON and Markdown reports.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Grid-search strategy parameters over one symbol's bars.
    Sweep {
        /// CSV bar file to sweep over.
        #[arg(long)]
        csv: PathBuf,

        /// Symbol name for the report.
        #[arg(long, default_value = "UNKNOWN")]
        symbol: String,

        /// Bar interval: 60m, 1h, 4h, or 1d.
        #[arg(long, default_value = "4h")]
        interval: String,

        /// Base preset: trend_following, obv_momentum, range_reversion, bidirectional.
        #[arg(long, default_value = "trend_following")]
        preset: String,

        /// How many top entries to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Optional JSON output path for the full ranking.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Walk a bar file and print the abstract order intents.
    Signal {
        /// CSV bar file to walk.
        #[arg(long)]
        csv: PathBuf,

        /// Symbol name for the intents.
        #[arg(long, default_value = "UNKNOWN")]
        symbol: String,

        /// Strategy preset.
        #[arg(long, default_value = "trend_following")]
        preset: String,

        /// Order quantity per intent.
        #[arg(long, default_value_t = 1.0)]
        quantity: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            data_dir,
            output_dir,
        } => cmd_run(&config, &data_dir, &output_dir),
        Commands::Sweep {
            csv,
            symbol,
            interval,
            preset,
            top,
            output,
        } => cmd_sweep(&csv, &symbol, &interval, &preset, top, output.as_deref()),
        Commands::Signal {
            csv,
            symbol,
            preset,
            quantity,
        } => cmd_signal(&csv, &symbol, &preset, quantity),
    }
}

fn cmd_run(config_path: &std::path::Path, data_dir: &std::path::Path, output_dir: &std::path::Path) -> Result<()> {
    let config = RunConfig::from_toml_file(config_path)
        .with_context(|| format!("loading config '{}'", config_path.display()))?;
    let portfolio = run_config(&config, data_dir)?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating '{}'", output_dir.display()))?;
    let json_path = output_dir.join(format!("{}.json", portfolio.run_id));
    let md_path = output_dir.join(format!("{}.md", portfolio.run_id));
    write_json_report(&portfolio, &json_path)?;
    write_markdown_report(&portfolio, &md_path)?;

    print!("{}", markdown_summary(&portfolio));
    println!();
    println!("Reports written to {} and {}", json_path.display(), md_path.display());
    Ok(())
}

fn cmd_sweep(
    csv: &std::path::Path,
    symbol: &str,
    interval: &str,
    preset: &str,
    top: usize,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let interval = parse_interval(interval)?;
    let bars = load_bars_csv(csv, symbol)?;
    let grid = ParamGrid::crossover_default(preset_params(preset)?);

    println!(
        "Sweeping up to {} combinations over {} bars of {symbol}...",
        grid.size(),
        bars.len()
    );
    let entries = sweep(&bars, &grid, interval);

    println!("| # | fast | slow | stop | trail | trades | return | sharpe |");
    println!("|---|---|---|---|---|---|---|---|");
    for (rank, entry) in entries.iter().take(top).enumerate() {
        println!(
            "| {} | {} | {} | {} | {} | {} | {:.2}% | {:.2} |",
            rank + 1,
            entry.params.ma_fast,
            entry.params.ma_slow,
            fmt_opt_pct(entry.params.stop_loss),
            fmt_opt_pct(entry.params.trailing_stop),
            entry.summary.trade_count,
            entry.summary.total_return * 100.0,
            entry.summary.sharpe,
        );
    }

    if let Some(path) = output {
        write_sweep_json(&entries, path)?;
        println!("Full ranking written to {}", path.display());
    }
    Ok(())
}

fn cmd_signal(csv: &std::path::Path, symbol: &str, preset: &str, quantity: f64) -> Result<()> {
    let bars = load_bars_csv(csv, symbol)?;
    let params = preset_params(preset)?;
    let intents = scan_intents(&bars, &params, quantity)?;

    if intents.is_empty() {
        println!("No intents over {} bars.", bars.len());
        return Ok(());
    }
    for intent in &intents {
        println!("{}", serde_json::to_string(intent)?);
    }
    Ok(())
}

fn parse_interval(s: &str) -> Result<Interval> {
    Interval::from_str(s).map_err(|e| anyhow::anyhow!(e))
}

fn preset_params(name: &str) -> Result<StrategyParams> {
    Ok(match name {
        "trend_following" => StrategyParams::trend_following(),
        "obv_momentum" => StrategyParams::obv_momentum(),
        "range_reversion" => StrategyParams::range_reversion(),
        "bidirectional" => StrategyParams::bidirectional(),
        other => bail!(
            "unknown preset '{other}' (expected trend_following, obv_momentum, range_reversion, or bidirectional)"
        ),
    })
}

fn fmt_opt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => "-".to_string(),
    }
}
