//! Engine layer — the bar walk and the execution seam.

pub mod executor;
pub mod walk;

pub use executor::{Executor, IntentRecorder, OrderIntent, OrderKind, OrderSide, TradeRecorder};
pub use walk::{run_backtest, scan_intents, walk, RunResult};
