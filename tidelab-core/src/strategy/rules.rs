//! Compiled rule set: ordered entry and exit predicates.
//!
//! `StrategyParams::compile()` turns a configuration into `StrategyRules`.
//! Entries are a conjunction evaluated in a fixed order; exits are a list in
//! fixed priority order where the first triggered condition wins and decides
//! the recorded exit reason. Each condition is a small pure predicate over a
//! `Snapshot` (and, for exits, the open `Position`), so a strategy variant
//! differs from another only in which conditions are present.

use crate::domain::{Bar, ExitReason, Position, Side};
use crate::indicators::{self, Atr, Indicator, IndicatorValues, Obv, ObvMa, Sma, TrendStrength};

use super::params::{ChannelParams, CrossMode, ParamError, StrategyParams, TakeProfit};
use super::snapshot::{Requirements, Snapshot};

/// One clause of the entry conjunction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryCondition {
    /// Close and the slow MA are both on the trend side of the trend MA.
    TrendAlignment,
    /// |close - trend_MA| / ATR must reach the threshold, else the regime
    /// is treated as ranging and no entry fires.
    TrendStrengthGate { min: f64 },
    /// Fast MA above (below) slow MA, per the configured cross mode.
    MaAlignment { mode: CrossMode },
    /// OBV above (below) its own MA, per the configured cross mode.
    ObvConfirm { mode: CrossMode },
    /// Close beyond the channel band on the reverting side: below the
    /// lower band for a long, above the upper band for a short.
    ChannelRevert { multiplier: f64 },
}

/// Which momentum comparison a reversal exit watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReversalSource {
    MaCross,
    ObvCross,
}

/// One exit predicate. Order in `StrategyRules::exits` is the tie-break
/// priority: first triggered wins, one exit per bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitCondition {
    SignalReversal { source: ReversalSource, mode: CrossMode },
    StopLoss { pct: f64 },
    TakeProfit(TakeProfit),
    /// `arm_past` is the stop-loss fraction when one is configured: the
    /// candidate trail price must clear entry by at least that distance
    /// before the trail can fire, so it never fires tighter than the hard
    /// stop right after entry.
    TrailingStop { pct: f64, arm_past: Option<f64> },
    /// Close recovered back through the channel midline (its MA). The band
    /// only gates entries; the reversion target is the MA itself.
    ChannelExit,
}

/// `a` above `b`, either as a current-level comparison or as a strict
/// cross on this exact bar.
fn above(mode: CrossMode, a: f64, b: f64, a_prev: f64, b_prev: f64) -> bool {
    match mode {
        CrossMode::Level => a > b,
        CrossMode::Strict => a > b && a_prev <= b_prev,
    }
}

impl EntryCondition {
    /// Does this clause hold for an entry on `side`?
    pub fn holds(&self, snap: &Snapshot, side: Side) -> bool {
        match *self {
            EntryCondition::TrendAlignment => match side {
                Side::Long => snap.close > snap.trend && snap.slow > snap.trend,
                Side::Short => snap.close < snap.trend && snap.slow < snap.trend,
            },
            EntryCondition::TrendStrengthGate { min } => snap.strength >= min,
            EntryCondition::MaAlignment { mode } => match side {
                Side::Long => above(mode, snap.fast, snap.slow, snap.fast_prev, snap.slow_prev),
                Side::Short => above(mode, snap.slow, snap.fast, snap.slow_prev, snap.fast_prev),
            },
            EntryCondition::ObvConfirm { mode } => match side {
                Side::Long => above(mode, snap.obv, snap.obv_ma, snap.obv_prev, snap.obv_ma_prev),
                Side::Short => above(mode, snap.obv_ma, snap.obv, snap.obv_ma_prev, snap.obv_prev),
            },
            EntryCondition::ChannelRevert { multiplier } => {
                let band = multiplier * snap.atr;
                match side {
                    Side::Long => snap.close < snap.channel_ma - band,
                    Side::Short => snap.close > snap.channel_ma + band,
                }
            }
        }
    }
}

impl ExitCondition {
    pub fn reason(&self) -> ExitReason {
        match self {
            ExitCondition::SignalReversal { .. } => ExitReason::SignalReversal,
            ExitCondition::StopLoss { .. } => ExitReason::StopLoss,
            ExitCondition::TakeProfit(_) => ExitReason::TakeProfit,
            ExitCondition::TrailingStop { .. } => ExitReason::TrailingStop,
            ExitCondition::ChannelExit => ExitReason::ChannelExit,
        }
    }

    /// Does this exit fire against the current bar's close?
    pub fn triggered(&self, snap: &Snapshot, pos: &Position) -> bool {
        match *self {
            ExitCondition::SignalReversal { source, mode } => {
                let (a, b, a_prev, b_prev) = match source {
                    ReversalSource::MaCross => {
                        (snap.fast, snap.slow, snap.fast_prev, snap.slow_prev)
                    }
                    ReversalSource::ObvCross => {
                        (snap.obv, snap.obv_ma, snap.obv_prev, snap.obv_ma_prev)
                    }
                };
                match pos.side {
                    Side::Long => above(mode, b, a, b_prev, a_prev),
                    Side::Short => above(mode, a, b, a_prev, b_prev),
                }
            }
            ExitCondition::StopLoss { pct } => pos.unrealized_return(snap.close) <= -pct,
            ExitCondition::TakeProfit(TakeProfit::FixedPct { pct }) => {
                pos.unrealized_return(snap.close) >= pct
            }
            ExitCondition::TakeProfit(TakeProfit::AtrMultiple { multiplier }) => {
                snap.atr.is_finite()
                    && pos.side.sign() * (snap.close - pos.entry_price) >= multiplier * snap.atr
            }
            ExitCondition::TrailingStop { pct, arm_past } => {
                match pos.side {
                    Side::Long => {
                        let trail = pos.extreme * (1.0 - pct);
                        let armed = match arm_past {
                            Some(sl) => trail > pos.entry_price * (1.0 + sl),
                            None => pos.extreme > pos.entry_price,
                        };
                        armed && snap.close <= trail
                    }
                    Side::Short => {
                        let trail = pos.extreme * (1.0 + pct);
                        let armed = match arm_past {
                            Some(sl) => trail < pos.entry_price * (1.0 - sl),
                            None => pos.extreme < pos.entry_price,
                        };
                        armed && snap.close >= trail
                    }
                }
            }
            ExitCondition::ChannelExit => match pos.side {
                Side::Long => snap.close > snap.channel_ma,
                Side::Short => snap.close < snap.channel_ma,
            },
        }
    }
}

/// A validated configuration compiled into predicate lists plus the
/// indicator series they read.
#[derive(Debug, Clone)]
pub struct StrategyRules {
    params: StrategyParams,
    entries: Vec<EntryCondition>,
    exits: Vec<ExitCondition>,
    requirements: Requirements,
    fast_name: String,
    slow_name: String,
    trend_name: Option<String>,
    strength_name: Option<String>,
    obv_ma_name: Option<String>,
    atr_name: Option<String>,
    channel_ma_name: Option<String>,
}

impl StrategyParams {
    /// Validate and compile into a rule set.
    pub fn compile(&self) -> Result<StrategyRules, ParamError> {
        self.validate()?;

        let mut entries = Vec::new();
        if self.ma_trend.is_some() {
            entries.push(EntryCondition::TrendAlignment);
        }
        if let Some(min) = self.min_trend_strength {
            entries.push(EntryCondition::TrendStrengthGate { min });
        }
        if let Some(channel) = &self.channel {
            entries.push(EntryCondition::ChannelRevert {
                multiplier: channel.atr_multiplier,
            });
        } else {
            entries.push(EntryCondition::MaAlignment {
                mode: self.cross_mode,
            });
            if self.obv_ma.is_some() {
                entries.push(EntryCondition::ObvConfirm {
                    mode: self.cross_mode,
                });
            }
        }

        // Priority order; first triggered wins.
        let mut exits = Vec::new();
        if self.exit_on_reversal {
            exits.push(ExitCondition::SignalReversal {
                source: ReversalSource::MaCross,
                mode: self.cross_mode,
            });
            if self.obv_ma.is_some() {
                exits.push(ExitCondition::SignalReversal {
                    source: ReversalSource::ObvCross,
                    mode: self.cross_mode,
                });
            }
        }
        if let Some(pct) = self.stop_loss {
            exits.push(ExitCondition::StopLoss { pct });
        }
        if let Some(tp) = self.take_profit {
            exits.push(ExitCondition::TakeProfit(tp));
        }
        if let Some(pct) = self.trailing_stop {
            exits.push(ExitCondition::TrailingStop {
                pct,
                arm_past: self.stop_loss,
            });
        }
        if self.channel.is_some() {
            exits.push(ExitCondition::ChannelExit);
        }

        let strict = self.cross_mode == CrossMode::Strict;
        let atr_needed = matches!(self.take_profit, Some(TakeProfit::AtrMultiple { .. }))
            || self.channel.is_some();
        let requirements = Requirements {
            prev_ma: strict,
            trend: self.ma_trend.is_some(),
            strength: self.min_trend_strength.is_some(),
            obv: self.obv_ma.is_some(),
            prev_obv: strict && self.obv_ma.is_some(),
            atr: atr_needed,
            channel_ma: self.channel.is_some(),
        };

        Ok(StrategyRules {
            entries,
            exits,
            requirements,
            fast_name: format!("sma_{}", self.ma_fast),
            slow_name: format!("sma_{}", self.ma_slow),
            trend_name: self.ma_trend.map(|p| format!("sma_{p}")),
            strength_name: self
                .min_trend_strength
                .and(self.ma_trend)
                .map(|t| format!("trend_strength_{t}_{}", self.atr_period)),
            obv_ma_name: self.obv_ma.map(|p| format!("obv_ma_{p}")),
            atr_name: atr_needed.then(|| format!("atr_{}", self.atr_period)),
            channel_ma_name: self
                .channel
                .as_ref()
                .map(|ChannelParams { ma_period, .. }| format!("sma_{ma_period}")),
            params: self.clone(),
        })
    }
}

impl StrategyRules {
    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    pub fn entries(&self) -> &[EntryCondition] {
        &self.entries
    }

    pub fn exits(&self) -> &[ExitCondition] {
        &self.exits
    }

    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    /// The indicator set this rule set reads, deduplicated by series name
    /// (e.g. a channel MA sharing the slow MA's window).
    pub fn indicator_set(&self) -> Vec<Box<dyn Indicator>> {
        let mut set: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(self.params.ma_fast)),
            Box::new(Sma::new(self.params.ma_slow)),
        ];
        if let Some(p) = self.params.ma_trend {
            set.push(Box::new(Sma::new(p)));
        }
        if self.params.min_trend_strength.is_some() {
            if let Some(t) = self.params.ma_trend {
                set.push(Box::new(TrendStrength::new(t, self.params.atr_period)));
            }
        }
        if let Some(p) = self.params.obv_ma {
            set.push(Box::new(Obv));
            set.push(Box::new(ObvMa::new(p)));
        }
        if self.atr_name.is_some() {
            set.push(Box::new(Atr::new(self.params.atr_period)));
        }
        if let Some(channel) = &self.params.channel {
            set.push(Box::new(Sma::new(channel.ma_period)));
        }
        set.sort_by(|a, b| a.name().cmp(b.name()));
        set.dedup_by(|a, b| a.name() == b.name());
        set
    }

    /// First bar index at which every required series is defined.
    pub fn warmup(&self) -> usize {
        indicators::warmup(&self.indicator_set())
    }

    /// Assemble the per-bar view at index `i` from precomputed series.
    /// Missing series and out-of-range previous indices come back NaN.
    pub fn snapshot(&self, values: &IndicatorValues, bar: &Bar, i: usize) -> Snapshot {
        let at = |name: &str, idx: usize| values.get(name, idx).unwrap_or(f64::NAN);
        let prev = |name: &str| {
            if i == 0 {
                f64::NAN
            } else {
                at(name, i - 1)
            }
        };
        let opt = |name: &Option<String>, idx: usize| {
            name.as_deref().map_or(f64::NAN, |n| at(n, idx))
        };

        Snapshot {
            close: bar.close,
            fast: at(&self.fast_name, i),
            slow: at(&self.slow_name, i),
            fast_prev: prev(&self.fast_name),
            slow_prev: prev(&self.slow_name),
            trend: opt(&self.trend_name, i),
            strength: opt(&self.strength_name, i),
            obv: if self.obv_ma_name.is_some() {
                at("obv", i)
            } else {
                f64::NAN
            },
            obv_ma: opt(&self.obv_ma_name, i),
            obv_prev: if self.obv_ma_name.is_some() && i > 0 {
                at("obv", i - 1)
            } else {
                f64::NAN
            },
            obv_ma_prev: self
                .obv_ma_name
                .as_deref()
                .map_or(f64::NAN, |n| prev(n)),
            atr: opt(&self.atr_name, i),
            channel_ma: opt(&self.channel_ma_name, i),
        }
    }

    /// True when the snapshot has every value the rules read; the caller
    /// skips the bar entirely otherwise.
    pub fn ready(&self, snap: &Snapshot) -> bool {
        snap.ready(&self.requirements)
    }

    /// Which side, if any, the entry conjunction admits on this bar. Longs
    /// are checked first; shorts only when the configuration allows them.
    pub fn entry_side(&self, snap: &Snapshot) -> Option<Side> {
        if self.entries.iter().all(|c| c.holds(snap, Side::Long)) {
            return Some(Side::Long);
        }
        if self.params.allow_short && self.entries.iter().all(|c| c.holds(snap, Side::Short)) {
            return Some(Side::Short);
        }
        None
    }

    /// Highest-priority exit that fires on this bar, if any.
    pub fn first_exit(&self, snap: &Snapshot, pos: &Position) -> Option<ExitReason> {
        self.exits
            .iter()
            .find(|e| e.triggered(snap, pos))
            .map(|e| e.reason())
    }
}
