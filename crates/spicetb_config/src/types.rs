//! Configuration types deserialized from `spicetb.toml`.

use serde::Deserialize;

/// The top-level testbench configuration parsed from `spicetb.toml`.
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BenchConfig {
    /// Supply voltage and digitization threshold.
    #[serde(default)]
    pub supply: SupplyConfig,
    /// Voltage band and run length used by every debounce watch.
    #[serde(default)]
    pub debounce: DebounceConfig,
    /// Snapshot reporting options.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Supply rail and logic threshold settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    /// Supply voltage in volts. Driven logic 1 is injected at this level.
    pub vdd: f64,
    /// Fraction of `vdd` above which a sample reads as logic 1.
    pub threshold_fraction: f64,
}

impl SupplyConfig {
    /// Returns the absolute digitization threshold in volts.
    pub fn threshold(&self) -> f64 {
        self.vdd * self.threshold_fraction
    }
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            vdd: 1.8,
            threshold_fraction: 0.45,
        }
    }
}

/// Band-residency settings shared by all debounce watches.
///
/// A sample is in band when it lies strictly between `low` and `high`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Lower band edge in volts (exclusive).
    pub low: f64,
    /// Upper band edge in volts (exclusive).
    pub high: f64,
    /// Consecutive in-band samples required before the watch enters the band.
    pub min_run: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            low: 0.4,
            high: 0.6,
            min_run: 3,
        }
    }
}

/// Snapshot reporting options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Emit a snapshot for every sample batch, not only on change.
    pub every_sample: bool,
}
