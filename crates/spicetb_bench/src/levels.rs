//! Logic levels and first-sample-aware change detection.

use spicetb_config::SupplyConfig;

/// Supply level and digitization threshold, fixed for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogicLevels {
    /// Supply voltage; driven logic 1 is injected at this level.
    pub vdd: f64,
    /// Samples strictly above this voltage read as logic 1.
    pub threshold: f64,
}

impl LogicLevels {
    /// Derives levels from the `[supply]` configuration section.
    pub fn from_supply(supply: &SupplyConfig) -> Self {
        Self {
            vdd: supply.vdd,
            threshold: supply.threshold(),
        }
    }

    /// Interprets a sampled voltage as a logic value.
    pub fn digitize(&self, value: f64) -> bool {
        value > self.threshold
    }

    /// Returns the voltage injected for a driven logic value.
    pub fn drive_level(&self, bit: bool) -> f64 {
        if bit {
            self.vdd
        } else {
            0.0
        }
    }
}

impl Default for LogicLevels {
    fn default() -> Self {
        Self::from_supply(&SupplyConfig::default())
    }
}

/// Tracks the last digitized value of one signal.
///
/// The first update after a [`reset`](Self::reset) always reports a change,
/// which forces an initial snapshot at the start of every run.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChangeDetector {
    last: bool,
    seen: bool,
}

impl ChangeDetector {
    /// Records a new value and returns whether it counts as a change.
    pub fn update(&mut self, value: bool) -> bool {
        let changed = !self.seen || value != self.last;
        self.last = value;
        self.seen = true;
        changed
    }

    /// Forgets the previous value so the next update reports a change.
    pub fn reset(&mut self) {
        self.seen = false;
    }

    /// Returns the last recorded value.
    pub fn value(&self) -> bool {
        self.last
    }
}
