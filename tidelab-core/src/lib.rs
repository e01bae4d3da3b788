//! Tidelab Core — domain types, indicators, strategy rules, and the
//! single-position bar-walk state machine.
//!
//! This crate contains the decision core shared by every strategy variant:
//! - Domain types (bars, positions, closed trades, intervals)
//! - Pure indicator functions (SMA, OBV, ATR, trend strength)
//! - Strategy parameters compiled into ordered entry/exit predicate lists
//! - The bar-by-bar FLAT/LONG/SHORT state machine
//! - The executor seam that splits backtest fills from live order intents

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;
