//! Strategy layer — configuration compiled into ordered predicate lists.
//!
//! Every strategy variant is a `StrategyParams` value-object, constructed
//! once per run and passed explicitly — never read from ambient state.
//! `StrategyParams::compile()` validates the parameters and produces
//! `StrategyRules`: the entry conditions (a conjunction, fixed evaluation
//! order) and exit conditions (fixed priority order) plus the indicator set
//! they require. A strategy variant is a configuration instance, not a
//! copy-pasted function.

pub mod params;
pub mod rules;
pub mod snapshot;

pub use params::{ChannelParams, CrossMode, ParamError, StrategyParams, TakeProfit};
pub use rules::{EntryCondition, ExitCondition, ReversalSource, StrategyRules};
pub use snapshot::Snapshot;
