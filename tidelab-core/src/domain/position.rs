//! Position — mutable state held by the state machine while not flat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Bar;

/// Direction of an open position. Flat is the absence of a `Position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short. Matches the sign convention of the
    /// realized-return formula.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

/// An open single-symbol position.
///
/// Created when an entry condition fires, destroyed when an exit fires.
/// Strictly one position per symbol at a time: no pyramiding, no hedging.
/// The trailing extreme is a high-water mark for longs and a low-water mark
/// for shorts; `update_extreme` keeps it monotone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    /// Highest high since entry (long) or lowest low since entry (short),
    /// seeded from the entry bar.
    pub extreme: f64,
    pub bars_held: usize,
}

impl Position {
    /// Open a position at the bar's close, seeding the trailing extreme
    /// from the bar's high (long) or low (short).
    pub fn open(side: Side, bar: &Bar, bar_index: usize) -> Self {
        let extreme = match side {
            Side::Long => bar.high,
            Side::Short => bar.low,
        };
        Self {
            side,
            entry_price: bar.close,
            entry_bar: bar_index,
            entry_time: bar.timestamp,
            extreme,
            bars_held: 0,
        }
    }

    /// Advance the trailing extreme with a new bar. Monotone: the extreme
    /// never retreats.
    pub fn update_extreme(&mut self, bar: &Bar) {
        match self.side {
            Side::Long => {
                if bar.high > self.extreme {
                    self.extreme = bar.high;
                }
            }
            Side::Short => {
                if bar.low < self.extreme {
                    self.extreme = bar.low;
                }
            }
        }
    }

    /// Signed fractional return if the position were closed at `price`.
    pub fn unrealized_return(&self, price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        self.side.sign() * (price - self.entry_price) / self.entry_price
    }
}
