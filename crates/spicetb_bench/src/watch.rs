//! Passive observers over the result vectors of a completed run.
//!
//! Watches digitize exactly like nets but never drive anything and do not
//! need the vectors to form a named bus: a [`VectorWatch`] can gather any N
//! vectors under one label.

use spicetb_common::BitVec;
use tracing::warn;

use crate::error::BenchError;
use crate::levels::{ChangeDetector, LogicLevels};
use crate::net::TIME_VECTOR;
use crate::report::{format_raw, Snapshot};
use crate::results::ResultVectors;

/// Reads sample `index` of the vector at `slot`, failing if either is out of range.
pub(crate) fn read_sample(
    run: &ResultVectors,
    slot: usize,
    index: usize,
    name: &str,
) -> Result<f64, BenchError> {
    let samples = run.samples(slot).unwrap_or_default();
    samples
        .get(index)
        .copied()
        .ok_or_else(|| BenchError::IndexOutOfRange {
            name: name.to_string(),
            index,
            len: samples.len(),
        })
}

/// N independently named vectors digitized and reported as one hex value.
#[derive(Clone, Debug)]
pub struct VectorWatch {
    label: String,
    names: Vec<String>,
    levels: LogicLevels,
    slots: Option<Vec<usize>>,
    detectors: Vec<ChangeDetector>,
    bits: BitVec,
}

impl VectorWatch {
    /// Creates a watch over `names`, the first name being bit 0.
    ///
    /// Fails with [`BenchError::WidthMismatch`] unless exactly `width` names
    /// are given.
    pub fn new(
        label: impl Into<String>,
        width: u32,
        names: Vec<String>,
        levels: LogicLevels,
    ) -> Result<Self, BenchError> {
        let label = label.into();
        if width == 0 {
            return Err(BenchError::InvalidWidth { name: label });
        }
        if names.len() != width as usize {
            return Err(BenchError::WidthMismatch {
                name: label,
                expected: width,
                actual: names.len(),
            });
        }
        Ok(Self {
            label,
            names,
            levels,
            slots: None,
            detectors: vec![ChangeDetector::default(); width as usize],
            bits: BitVec::new(width),
        })
    }

    /// Returns the watch label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the watched vector names in bit order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the current digitized value.
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    /// Returns true if every watched vector exists in the current run.
    pub fn is_resolved(&self) -> bool {
        self.slots.is_some()
    }

    /// Locates the watched vectors in a new run.
    ///
    /// If any vector is missing the whole watch stays inert for the run.
    pub fn resolve(&mut self, run: &ResultVectors) -> bool {
        for detector in &mut self.detectors {
            detector.reset();
        }
        let slots: Option<Vec<usize>> = self.names.iter().map(|n| run.slot(n)).collect();
        if slots.is_none() {
            let missing: Vec<&str> = self
                .names
                .iter()
                .filter(|n| run.slot(n).is_none())
                .map(String::as_str)
                .collect();
            warn!(watch = %self.label, ?missing, "unresolved watch ignored");
        }
        self.slots = slots;
        self.slots.is_some()
    }

    /// Digitizes sample `index` of every vector; returns whether any bit changed.
    pub fn evaluate(&mut self, run: &ResultVectors, index: usize) -> Result<bool, BenchError> {
        let Some(slots) = &self.slots else {
            return Ok(false);
        };
        let mut changed = false;
        for (bit, &slot) in slots.iter().enumerate() {
            let raw = read_sample(run, slot, index, &self.names[bit])?;
            let value = self.levels.digitize(raw);
            changed |= self.detectors[bit].update(value);
            self.bits.set(bit as u32, value);
        }
        Ok(changed)
    }

    /// Adds `label=<hex>` to the snapshot. Inert watches report nothing.
    pub fn report(&self, snapshot: &mut Snapshot) {
        if self.is_resolved() {
            snapshot.push(&self.label, self.bits.to_hex());
        }
    }
}

/// Observer of the run's time vector; bounds the playback loop.
#[derive(Clone, Debug, Default)]
pub struct TimeWatch {
    slot: Option<usize>,
    samples: usize,
    current: usize,
    value: f64,
}

impl TimeWatch {
    /// Creates an unresolved time watch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locates the `time` vector in a new run.
    pub fn resolve(&mut self, run: &ResultVectors) -> bool {
        self.slot = run.slot(TIME_VECTOR);
        self.samples = run.get(TIME_VECTOR).map_or(0, <[f64]>::len);
        self.current = 0;
        self.value = 0.0;
        if self.slot.is_none() {
            warn!("run has no time vector, nothing to play back");
        }
        self.slot.is_some()
    }

    /// Returns the number of samples in the run.
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Returns the current sample index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns the time at the current sample index.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Moves to sample `index`. Time never counts as a change.
    pub fn evaluate(&mut self, run: &ResultVectors, index: usize) -> Result<bool, BenchError> {
        if let Some(slot) = self.slot {
            self.value = read_sample(run, slot, index, TIME_VECTOR)?;
            self.current = index;
        }
        Ok(false)
    }

    /// Adds the raw time value to the snapshot.
    pub fn report(&self, snapshot: &mut Snapshot) {
        if self.slot.is_some() {
            snapshot.push(TIME_VECTOR, format_raw(self.value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn levels() -> LogicLevels {
        LogicLevels {
            vdd: 1.8,
            threshold: 0.9,
        }
    }

    #[test]
    fn width_mismatch_is_rejected() {
        let err = VectorWatch::new("w", 3, names(&["a", "b"]), levels()).unwrap_err();
        assert!(matches!(
            err,
            BenchError::WidthMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
        assert!(matches!(
            VectorWatch::new("w", 0, Vec::new(), levels()),
            Err(BenchError::InvalidWidth { .. })
        ));
    }

    #[test]
    fn digitizes_unrelated_vectors_as_one_value() {
        let run: ResultVectors = [
            ("x.n1", vec![0.0, 1.8, 1.8]),
            ("y.n7", vec![1.8, 1.8, 0.0]),
        ]
        .into_iter()
        .collect();
        let mut w = VectorWatch::new("pair", 2, names(&["x.n1", "y.n7"]), levels()).unwrap();
        assert!(w.resolve(&run));
        assert!(w.evaluate(&run, 0).unwrap());
        assert_eq!(w.bits().to_u64(), Some(0b10));
        assert!(w.evaluate(&run, 1).unwrap());
        assert!(w.evaluate(&run, 2).unwrap());
        let mut snap = Snapshot::new();
        w.report(&mut snap);
        assert_eq!(snap.to_string(), "pair=1");
    }

    #[test]
    fn first_sample_always_changes() {
        let run: ResultVectors = [("a", vec![0.0, 0.0])].into_iter().collect();
        let mut w = VectorWatch::new("a", 1, names(&["a"]), levels()).unwrap();
        w.resolve(&run);
        assert!(w.evaluate(&run, 0).unwrap());
        assert!(!w.evaluate(&run, 1).unwrap());
    }

    #[test]
    fn missing_vector_makes_watch_inert() {
        let run: ResultVectors = [("a", vec![1.8])].into_iter().collect();
        let mut w = VectorWatch::new("ab", 2, names(&["a", "b"]), levels()).unwrap();
        assert!(!w.resolve(&run));
        assert!(!w.evaluate(&run, 0).unwrap());
        let mut snap = Snapshot::new();
        w.report(&mut snap);
        assert!(snap.is_empty());
    }

    #[test]
    fn short_vector_is_fatal() {
        let run: ResultVectors = [("a", vec![1.8])].into_iter().collect();
        let mut w = VectorWatch::new("a", 1, names(&["a"]), levels()).unwrap();
        w.resolve(&run);
        assert!(matches!(
            w.evaluate(&run, 3),
            Err(BenchError::IndexOutOfRange {
                index: 3,
                len: 1,
                ..
            })
        ));
    }

    #[test]
    fn time_watch_counts_samples_and_reports_raw() {
        let run: ResultVectors = [("time", vec![0.0, 1e-9, 2e-9])].into_iter().collect();
        let mut t = TimeWatch::new();
        assert!(t.resolve(&run));
        assert_eq!(t.sample_count(), 3);
        assert!(!t.evaluate(&run, 2).unwrap());
        assert_eq!(t.current(), 2);
        let mut snap = Snapshot::new();
        t.report(&mut snap);
        assert_eq!(snap.to_string(), "time=2.000000e-09");
    }

    #[test]
    fn time_watch_without_time_vector() {
        let run = ResultVectors::new();
        let mut t = TimeWatch::new();
        assert!(!t.resolve(&run));
        assert_eq!(t.sample_count(), 0);
    }
}
