//! StrategyParams — the immutable configuration value-object.
//!
//! All recognized options with their defaults live here. Validation fails
//! fast at construction time with a descriptive error, before any bar is
//! processed: the state machine has no way to detect a pathological
//! configuration mid-walk.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a two-line comparison is evaluated.
///
/// The source variants disagree on whether a "golden/death cross" requires
/// the cross to happen on this exact bar or just the current ordering, so
/// both are preserved as configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossMode {
    /// The fast line crossed the slow line on this exact bar.
    Strict,
    /// The fast line is currently above (below) the slow line.
    Level,
}

/// Take-profit target style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TakeProfit {
    /// Favorable move from entry exceeds a fixed fraction.
    FixedPct { pct: f64 },
    /// Favorable move from entry exceeds ATR × multiplier.
    AtrMultiple { multiplier: f64 },
}

/// Mean-reversion channel: a moving average ± ATR × multiplier band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelParams {
    pub ma_period: usize,
    pub atr_multiplier: f64,
}

/// Errors detected at configuration-construction time.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{name} period must be >= 1")]
    ZeroPeriod { name: &'static str },

    #[error("ma_fast ({fast}) must be shorter than ma_slow ({slow})")]
    FastNotBelowSlow { fast: usize, slow: usize },

    #[error("ma_slow ({slow}) must be shorter than ma_trend ({trend})")]
    SlowNotBelowTrend { slow: usize, trend: usize },

    #[error("{name} must be a fraction in (0, 1), got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositiveMultiplier { name: &'static str, value: f64 },

    #[error("min_trend_strength must be non-negative, got {0}")]
    NegativeTrendStrength(f64),

    #[error("min_trend_strength requires ma_trend to be set")]
    TrendStrengthWithoutTrendMa,
}

/// Immutable per-run strategy configuration.
///
/// `None` disables the corresponding filter or exit, and an omitted option
/// in a config file stays disabled. The default is the bare MA5/MA20
/// crossover with a reversal exit and nothing else; the named presets
/// layer the tuned variants on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Fast moving-average window.
    pub ma_fast: usize,
    /// Slow moving-average window.
    pub ma_slow: usize,
    /// Long-period trend filter window; `None` disables the trend regime
    /// filter.
    pub ma_trend: Option<usize>,
    /// ATR window for volatility-scaled targets and the channel band.
    pub atr_period: usize,
    /// Crossover evaluation mode for the MA and OBV comparisons.
    pub cross_mode: CrossMode,
    /// OBV moving-average window for the energy-confirmation filter;
    /// `None` disables OBV confirmation.
    pub obv_ma: Option<usize>,
    /// Close the position when the momentum filter that justified entry
    /// flips.
    pub exit_on_reversal: bool,
    /// Fixed stop-loss as an adverse fraction from entry.
    pub stop_loss: Option<f64>,
    /// Take-profit target.
    pub take_profit: Option<TakeProfit>,
    /// Trailing-stop retrace fraction from the running extreme.
    pub trailing_stop: Option<f64>,
    /// Minimum |close - trend_MA| / ATR for a regime to count as trending.
    pub min_trend_strength: Option<f64>,
    /// Permit short entries (downtrend mirror of every long condition).
    pub allow_short: bool,
    /// Mean-reversion channel; when set it replaces the MA/OBV momentum
    /// entry with a band-reversion entry and adds the channel exit.
    pub channel: Option<ChannelParams>,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            ma_fast: 5,
            ma_slow: 20,
            ma_trend: None,
            atr_period: 14,
            cross_mode: CrossMode::Level,
            obv_ma: None,
            exit_on_reversal: true,
            stop_loss: None,
            take_profit: None,
            trailing_stop: None,
            min_trend_strength: None,
            allow_short: false,
            channel: None,
        }
    }
}

impl StrategyParams {
    /// Trend-following variant: MA5/MA20 momentum gated by an MA60 regime
    /// filter, 3% stop, 8% target, reversal exit.
    pub fn trend_following() -> Self {
        Self {
            ma_trend: Some(60),
            stop_loss: Some(0.03),
            take_profit: Some(TakeProfit::FixedPct { pct: 0.08 }),
            ..Self::default()
        }
    }

    /// OBV momentum variant: MA alignment plus OBV energy confirmation,
    /// exits on stops, targets and the trail only.
    pub fn obv_momentum() -> Self {
        Self {
            obv_ma: Some(5),
            exit_on_reversal: false,
            stop_loss: Some(0.03),
            take_profit: Some(TakeProfit::FixedPct { pct: 0.08 }),
            trailing_stop: Some(0.03),
            ..Self::default()
        }
    }

    /// Range-trading variant: buy below the MA20 − 2×ATR band, exit on
    /// the recovery back through the MA20 or on stops.
    pub fn range_reversion() -> Self {
        Self {
            exit_on_reversal: false,
            stop_loss: Some(0.03),
            take_profit: Some(TakeProfit::FixedPct { pct: 0.06 }),
            channel: Some(ChannelParams {
                ma_period: 20,
                atr_multiplier: 2.0,
            }),
            ..Self::default()
        }
    }

    /// Bidirectional futures variant: longer windows, both sides, a trend
    /// strength gate, ATR-scaled target and a trailing stop.
    pub fn bidirectional() -> Self {
        Self {
            ma_fast: 10,
            ma_slow: 30,
            ma_trend: Some(80),
            exit_on_reversal: false,
            stop_loss: Some(0.03),
            take_profit: Some(TakeProfit::AtrMultiple { multiplier: 2.0 }),
            trailing_stop: Some(0.03),
            min_trend_strength: Some(0.02),
            allow_short: true,
            ..Self::default()
        }
    }

    /// Check every cross-field constraint. Called by `compile()`; callers
    /// constructing params by hand should call this before any bar walk.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.ma_fast == 0 {
            return Err(ParamError::ZeroPeriod { name: "ma_fast" });
        }
        if self.ma_slow == 0 {
            return Err(ParamError::ZeroPeriod { name: "ma_slow" });
        }
        if self.atr_period == 0 {
            return Err(ParamError::ZeroPeriod { name: "atr_period" });
        }
        if self.ma_fast >= self.ma_slow {
            return Err(ParamError::FastNotBelowSlow {
                fast: self.ma_fast,
                slow: self.ma_slow,
            });
        }
        if let Some(trend) = self.ma_trend {
            if trend == 0 {
                return Err(ParamError::ZeroPeriod { name: "ma_trend" });
            }
            if self.ma_slow >= trend {
                return Err(ParamError::SlowNotBelowTrend {
                    slow: self.ma_slow,
                    trend,
                });
            }
        }
        if self.obv_ma == Some(0) {
            return Err(ParamError::ZeroPeriod { name: "obv_ma" });
        }
        check_fraction("stop_loss", self.stop_loss)?;
        check_fraction("trailing_stop", self.trailing_stop)?;
        match self.take_profit {
            Some(TakeProfit::FixedPct { pct }) => check_fraction("take_profit", Some(pct))?,
            Some(TakeProfit::AtrMultiple { multiplier }) => {
                if multiplier <= 0.0 {
                    return Err(ParamError::NonPositiveMultiplier {
                        name: "take_profit",
                        value: multiplier,
                    });
                }
            }
            None => {}
        }
        if let Some(min) = self.min_trend_strength {
            if min < 0.0 {
                return Err(ParamError::NegativeTrendStrength(min));
            }
            if self.ma_trend.is_none() {
                return Err(ParamError::TrendStrengthWithoutTrendMa);
            }
        }
        if let Some(channel) = &self.channel {
            if channel.ma_period == 0 {
                return Err(ParamError::ZeroPeriod { name: "channel.ma_period" });
            }
            if channel.atr_multiplier <= 0.0 {
                return Err(ParamError::NonPositiveMultiplier {
                    name: "channel.atr_multiplier",
                    value: channel.atr_multiplier,
                });
            }
        }
        Ok(())
    }
}

fn check_fraction(name: &'static str, value: Option<f64>) -> Result<(), ParamError> {
    if let Some(v) = value {
        if !(v > 0.0 && v < 1.0) {
            return Err(ParamError::FractionOutOfRange { name, value: v });
        }
    }
    Ok(())
}
