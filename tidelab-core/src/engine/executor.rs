//! Execution seam between signal decisions and their consequences.
//!
//! The state machine decides WHEN to enter and exit; an `Executor` decides
//! what that means. `TradeRecorder` turns transitions into `ClosedTrade`
//! records (backtest). `IntentRecorder` turns them into abstract order
//! intents (live signal scanning) — the core never touches transport or
//! authentication concerns.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, ClosedTrade, ExitReason, Position, Side};

/// Receives state-machine transitions as they happen during a bar walk.
pub trait Executor {
    fn on_entry(&mut self, symbol: &str, side: Side, bar: &Bar, bar_index: usize);

    fn on_exit(
        &mut self,
        symbol: &str,
        position: &Position,
        bar: &Bar,
        bar_index: usize,
        reason: ExitReason,
    );
}

/// Order direction as an exchange sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    fn to_open(side: Side) -> Self {
        match side {
            Side::Long => OrderSide::Buy,
            Side::Short => OrderSide::Sell,
        }
    }

    fn to_close(side: Side) -> Self {
        match side {
            Side::Long => OrderSide::Sell,
            Side::Short => OrderSide::Buy,
        }
    }
}

/// Order type. Stop orders carry the protective trigger price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderKind {
    Market,
    Stop { stop_price: f64 },
}

/// An abstract order the caller may translate into an exchange call. The
/// core only decides whether to emit these, never how they are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: f64,
}

/// Backtest executor: accumulates `ClosedTrade` records.
#[derive(Debug, Default)]
pub struct TradeRecorder {
    trades: Vec<ClosedTrade>,
}

impl TradeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_trades(self) -> Vec<ClosedTrade> {
        self.trades
    }
}

impl Executor for TradeRecorder {
    fn on_entry(&mut self, _symbol: &str, _side: Side, _bar: &Bar, _bar_index: usize) {}

    fn on_exit(
        &mut self,
        symbol: &str,
        position: &Position,
        bar: &Bar,
        bar_index: usize,
        reason: ExitReason,
    ) {
        self.trades.push(ClosedTrade::from_exit(
            position,
            symbol,
            bar_index,
            bar.timestamp,
            bar.close,
            reason,
        ));
    }
}

/// Live-signal executor: accumulates abstract order intents.
///
/// An entry emits a market order plus, when a hard stop is configured, a
/// protective stop order at the stop price. An exit emits the closing
/// market order.
#[derive(Debug)]
pub struct IntentRecorder {
    quantity: f64,
    stop_loss: Option<f64>,
    intents: Vec<OrderIntent>,
}

impl IntentRecorder {
    pub fn new(quantity: f64, stop_loss: Option<f64>) -> Self {
        Self {
            quantity,
            stop_loss,
            intents: Vec::new(),
        }
    }

    pub fn into_intents(self) -> Vec<OrderIntent> {
        self.intents
    }
}

impl Executor for IntentRecorder {
    fn on_entry(&mut self, symbol: &str, side: Side, bar: &Bar, _bar_index: usize) {
        self.intents.push(OrderIntent {
            symbol: symbol.to_string(),
            side: OrderSide::to_open(side),
            kind: OrderKind::Market,
            quantity: self.quantity,
        });
        if let Some(sl) = self.stop_loss {
            let stop_price = bar.close * (1.0 - side.sign() * sl);
            self.intents.push(OrderIntent {
                symbol: symbol.to_string(),
                side: OrderSide::to_close(side),
                kind: OrderKind::Stop { stop_price },
                quantity: self.quantity,
            });
        }
    }

    fn on_exit(
        &mut self,
        symbol: &str,
        position: &Position,
        _bar: &Bar,
        _bar_index: usize,
        _reason: ExitReason,
    ) {
        self.intents.push(OrderIntent {
            symbol: symbol.to_string(),
            side: OrderSide::to_close(position.side),
            kind: OrderKind::Market,
            quantity: self.quantity,
        });
    }
}
