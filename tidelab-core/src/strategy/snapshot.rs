//! Per-bar view of the derived values the predicates read.
//!
//! A `Snapshot` is assembled once per bar from the precomputed indicator
//! series; fields a configuration does not use stay NaN. `Requirements`
//! records which fields the compiled rule set actually reads, so `ready()`
//! can tell a genuinely missing value from an unused one.

/// Derived values as of one bar. Unused fields are NaN.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    pub close: f64,
    pub fast: f64,
    pub slow: f64,
    pub fast_prev: f64,
    pub slow_prev: f64,
    pub trend: f64,
    pub strength: f64,
    pub obv: f64,
    pub obv_ma: f64,
    pub obv_prev: f64,
    pub obv_ma_prev: f64,
    pub atr: f64,
    pub channel_ma: f64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            close: f64::NAN,
            fast: f64::NAN,
            slow: f64::NAN,
            fast_prev: f64::NAN,
            slow_prev: f64::NAN,
            trend: f64::NAN,
            strength: f64::NAN,
            obv: f64::NAN,
            obv_ma: f64::NAN,
            obv_prev: f64::NAN,
            obv_ma_prev: f64::NAN,
            atr: f64::NAN,
            channel_ma: f64::NAN,
        }
    }
}

/// Which snapshot fields the compiled rules read. Close/fast/slow are
/// always required and have no flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    pub prev_ma: bool,
    pub trend: bool,
    pub strength: bool,
    pub obv: bool,
    pub prev_obv: bool,
    pub atr: bool,
    pub channel_ma: bool,
}

impl Snapshot {
    /// True when every field the rule set reads is defined. An undefined
    /// required value means the bar is still in warm-up and must be
    /// skipped, never evaluated against a partial window.
    pub fn ready(&self, req: &Requirements) -> bool {
        if !(self.close.is_finite() && self.fast.is_finite() && self.slow.is_finite()) {
            return false;
        }
        if req.prev_ma && !(self.fast_prev.is_finite() && self.slow_prev.is_finite()) {
            return false;
        }
        if req.trend && !self.trend.is_finite() {
            return false;
        }
        if req.strength && !self.strength.is_finite() {
            return false;
        }
        if req.obv && !(self.obv.is_finite() && self.obv_ma.is_finite()) {
            return false;
        }
        if req.prev_obv && !(self.obv_prev.is_finite() && self.obv_ma_prev.is_finite()) {
            return false;
        }
        if req.atr && !self.atr.is_finite() {
            return false;
        }
        if req.channel_ma && !self.channel_ma.is_finite() {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_fields_always_required() {
        let snap = Snapshot::default();
        assert!(!snap.ready(&Requirements::default()));

        let snap = Snapshot {
            close: 100.0,
            fast: 101.0,
            slow: 99.0,
            ..Snapshot::default()
        };
        assert!(snap.ready(&Requirements::default()));
    }

    #[test]
    fn unused_nan_fields_do_not_block() {
        let snap = Snapshot {
            close: 100.0,
            fast: 101.0,
            slow: 99.0,
            ..Snapshot::default()
        };
        // trend is NaN but not required.
        assert!(snap.ready(&Requirements::default()));
        // Flag it required and readiness flips.
        assert!(!snap.ready(&Requirements {
            trend: true,
            ..Requirements::default()
        }));
    }

    #[test]
    fn prev_flags_gate_strict_mode() {
        let mut snap = Snapshot {
            close: 100.0,
            fast: 101.0,
            slow: 99.0,
            ..Snapshot::default()
        };
        let req = Requirements {
            prev_ma: true,
            ..Requirements::default()
        };
        assert!(!snap.ready(&req));
        snap.fast_prev = 98.0;
        snap.slow_prev = 99.0;
        assert!(snap.ready(&req));
    }
}
