//! Debounced band-residency detection.
//!
//! A [`DebounceWatch`] declares a signal "in band" only after it has stayed
//! strictly inside `(low, high)` for `min_run` consecutive samples, and
//! declares it out of band on the first sample that leaves. Typical use is
//! spotting nodes that settle at an intermediate, neither-0-nor-1 level.

use std::fmt;

use serde::{Deserialize, Serialize};
use spicetb_config::DebounceConfig;
use tracing::warn;

use crate::error::BenchError;
use crate::report::format_raw;
use crate::results::ResultVectors;
use crate::watch::read_sample;

/// A transition of a debounce watch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebounceEvent {
    /// The watch label.
    pub label: String,
    /// The new debounced state.
    pub in_band: bool,
    /// The sample index at which the transition happened.
    pub index: usize,
    /// The raw sample at that index.
    pub raw: f64,
}

impl fmt::Display for DebounceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} index={} raw={}",
            self.label,
            u8::from(self.in_band),
            self.index,
            format_raw(self.raw)
        )
    }
}

/// Debounced detector of residency inside a voltage band.
#[derive(Clone, Debug)]
pub struct DebounceWatch {
    label: String,
    net: String,
    config: DebounceConfig,
    slot: Option<usize>,
    run_length: u32,
    in_band: bool,
}

impl DebounceWatch {
    /// Creates a watch over the vector `net` using the shared band settings.
    pub fn new(label: impl Into<String>, net: impl Into<String>, config: DebounceConfig) -> Self {
        Self {
            label: label.into(),
            net: net.into(),
            config,
            slot: None,
            run_length: 0,
            in_band: false,
        }
    }

    /// Returns the watch label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the debounced state.
    pub fn in_band(&self) -> bool {
        self.in_band
    }

    /// Returns the number of consecutive in-band samples seen so far.
    pub fn run_length(&self) -> u32 {
        self.run_length
    }

    /// Locates the watched vector in a new run and clears the debounce state.
    pub fn resolve(&mut self, run: &ResultVectors) -> bool {
        self.slot = run.slot(&self.net);
        self.run_length = 0;
        self.in_band = false;
        if self.slot.is_none() {
            warn!(watch = %self.label, vector = %self.net, "unresolved watch ignored");
        }
        self.slot.is_some()
    }

    /// Advances to sample `index`, returning the transition it causes, if any.
    pub fn evaluate(
        &mut self,
        run: &ResultVectors,
        index: usize,
    ) -> Result<Option<DebounceEvent>, BenchError> {
        let Some(slot) = self.slot else {
            return Ok(None);
        };
        let raw = read_sample(run, slot, index, &self.net)?;
        Ok(self.step(raw).then(|| DebounceEvent {
            label: self.label.clone(),
            in_band: self.in_band,
            index,
            raw,
        }))
    }

    /// Feeds one raw value; returns true if the debounced state flipped.
    fn step(&mut self, raw: f64) -> bool {
        if raw > self.config.low && raw < self.config.high {
            self.run_length = self.run_length.saturating_add(1);
            if !self.in_band && self.run_length >= self.config.min_run {
                self.in_band = true;
                return true;
            }
        } else {
            self.run_length = 0;
            if self.in_band {
                self.in_band = false;
                return true;
            }
        }
        false
    }
}
