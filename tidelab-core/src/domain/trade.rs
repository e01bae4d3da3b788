//! ClosedTrade — an immutable record emitted when a position closes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Position, Side};

/// Why a position was closed.
///
/// The declaration order is the tie-break priority: when several exit
/// conditions are true on the same bar, the first in this order is the one
/// recorded, and only one trade is emitted for that bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    SignalReversal,
    StopLoss,
    TakeProfit,
    TrailingStop,
    ChannelExit,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::SignalReversal => "signal_reversal",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::TrailingStop => "trailing_stop",
            ExitReason::ChannelExit => "channel_exit",
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete round-trip trade record: entry → exit.
///
/// The realized return is computed strictly from this trade's own entry and
/// exit prices, independent of any portfolio sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub symbol: String,
    pub side: Side,

    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,

    pub exit_bar: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,

    /// Signed fractional return: (exit-entry)/entry for longs, negated for shorts.
    pub return_frac: f64,
    pub reason: ExitReason,
    pub bars_held: usize,
}

impl ClosedTrade {
    /// Build the record from the closing position and the exit bar's close.
    pub fn from_exit(
        position: &Position,
        symbol: &str,
        exit_bar: usize,
        exit_time: DateTime<Utc>,
        exit_price: f64,
        reason: ExitReason,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            side: position.side,
            entry_bar: position.entry_bar,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_bar,
            exit_time,
            exit_price,
            return_frac: position.unrealized_return(exit_price),
            reason,
            bars_held: position.bars_held,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.return_frac > 0.0
    }
}
