//! Domain types for Tidelab.

pub mod bar;
pub mod interval;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use interval::Interval;
pub use position::{Position, Side};
pub use trade::{ClosedTrade, ExitReason};
