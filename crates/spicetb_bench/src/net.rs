//! Digital nets backed by simulator voltage samples.
//!
//! A [`ScalarNet`] is one digital signal; a [`VectorNet`](crate::vector::VectorNet)
//! owns a bus of them. [`Net`] is the closed set of shapes the registry stores.
//! The simulation time axis is a [`TimeNet`], which is read like a scalar but
//! reported raw and never counts as a change.

use serde::{Deserialize, Serialize};
use spicetb_common::FormatError;
use tracing::warn;

use crate::error::BenchError;
use crate::levels::{ChangeDetector, LogicLevels};
use crate::registry::VectorTable;
use crate::report::{format_raw, Snapshot};
use crate::vector::VectorNet;

/// Name of the simulator's time vector.
pub const TIME_VECTOR: &str = "time";

/// Whether the testbench drives a net.
///
/// `Output` means "not driven by the testbench"; it covers internal nodes too.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Driven by the testbench through an external voltage source.
    Input,
    /// Observed only.
    Output,
}

/// A single-bit digital signal.
#[derive(Clone, Debug)]
pub struct ScalarNet {
    name: String,
    direction: Direction,
    levels: LogicLevels,
    detector: ChangeDetector,
    real_value: f64,
    drive_value: f64,
    slot: Option<usize>,
}

impl ScalarNet {
    /// Creates an unresolved net.
    pub fn new(name: impl Into<String>, direction: Direction, levels: LogicLevels) -> Self {
        Self {
            name: name.into(),
            direction,
            levels,
            detector: ChangeDetector::default(),
            real_value: 0.0,
            drive_value: 0.0,
            slot: None,
        }
    }

    /// Returns the net name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the drive direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns true if the testbench drives this net.
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    /// Drives logic 1 for any nonzero value, logic 0 otherwise.
    ///
    /// Ignored for output nets.
    pub fn set_value(&mut self, value: u64) {
        self.set_bit(value != 0);
    }

    /// Drives the given logic value. Ignored for output nets.
    pub fn set_bit(&mut self, bit: bool) {
        if !self.is_input() {
            return;
        }
        self.drive_value = self.levels.drive_level(bit);
    }

    /// Drives a single binary digit, `"0"` or `"1"`.
    ///
    /// The digit is validated for every net; the drive is ignored for
    /// output nets.
    pub fn set_str(&mut self, value: &str) -> Result<(), BenchError> {
        let mut chars = value.chars();
        let bit = match (chars.next(), chars.next()) {
            (Some('0'), None) => false,
            (Some('1'), None) => true,
            (Some(digit), None) => {
                return Err(BenchError::format(
                    &self.name,
                    FormatError::InvalidDigit { digit, radix: 2 },
                ));
            }
            _ => {
                return Err(BenchError::format(
                    &self.name,
                    FormatError::Length {
                        expected: 1,
                        actual: value.chars().count(),
                    },
                ));
            }
        };
        self.set_bit(bit);
        Ok(())
    }

    /// Returns the voltage the external source should inject.
    pub fn drive_value(&self) -> f64 {
        self.drive_value
    }

    /// Returns the last digitized value.
    pub fn logic_value(&self) -> bool {
        self.detector.value()
    }

    /// Returns the last sampled voltage.
    pub fn real_value(&self) -> f64 {
        self.real_value
    }

    /// Returns true if the net found its vector in the current run.
    pub fn is_resolved(&self) -> bool {
        self.slot.is_some()
    }

    /// Looks up this net's sample index for a new run.
    ///
    /// A name missing from the table leaves the net inert for the whole run.
    pub fn resolve(&mut self, table: &VectorTable) -> bool {
        self.detector.reset();
        self.slot = table.index_of(&self.name);
        if self.slot.is_none() {
            warn!(net = %self.name, "unresolved net ignored");
        }
        self.slot.is_some()
    }

    /// Digitizes this net's sample and returns whether its value changed.
    ///
    /// The first evaluation after [`resolve`](Self::resolve) always counts as
    /// a change. Inert nets never change.
    pub fn evaluate(&mut self, samples: &[f64]) -> Result<bool, BenchError> {
        let Some(index) = self.slot else {
            return Ok(false);
        };
        let raw = *samples.get(index).ok_or_else(|| BenchError::IndexOutOfRange {
            name: self.name.clone(),
            index,
            len: samples.len(),
        })?;
        self.real_value = raw;
        Ok(self.detector.update(self.levels.digitize(raw)))
    }

    /// Adds `name=0|1` to the snapshot. Inert nets report nothing.
    pub fn report(&self, snapshot: &mut Snapshot) {
        if self.is_resolved() {
            snapshot.push(&self.name, if self.logic_value() { "1" } else { "0" });
        }
    }

    /// Returns the continuation line binding this net as a subcircuit port.
    pub fn port_line(&self) -> String {
        format!("+{}", self.name)
    }

    /// Returns a single-shot pulse source line: `0` to `vdd` with 1ps edges,
    /// held high for `duration` after a `duration` delay.
    pub fn pulse_line(&self, duration: &str) -> String {
        format!(
            "V{name} {name} gnd pulse( 0 {vdd:.6} 0 1p 1p {duration} {duration} 1 )",
            name = self.name,
            vdd = self.levels.vdd
        )
    }

    /// Returns the external voltage source line for input nets.
    pub fn drive_source_line(&self) -> Option<String> {
        self.is_input()
            .then(|| format!("V{name} {name} 0 0 external", name = self.name))
    }
}

/// The simulation time axis.
#[derive(Clone, Debug)]
pub struct TimeNet {
    inner: ScalarNet,
}

impl TimeNet {
    /// Creates the unresolved time net.
    pub fn new(levels: LogicLevels) -> Self {
        Self {
            inner: ScalarNet::new(TIME_VECTOR, Direction::Output, levels),
        }
    }

    /// Returns the current simulation time.
    pub fn value(&self) -> f64 {
        self.inner.real_value()
    }

    /// Returns true if the time vector was found in the current run.
    pub fn is_resolved(&self) -> bool {
        self.inner.is_resolved()
    }

    /// Looks up the time vector for a new run.
    pub fn resolve(&mut self, table: &VectorTable) -> bool {
        self.inner.resolve(table)
    }

    /// Reads the current time. Time never counts as a change.
    pub fn evaluate(&mut self, samples: &[f64]) -> Result<bool, BenchError> {
        self.inner.evaluate(samples)?;
        Ok(false)
    }

    /// Adds the raw time value to the snapshot.
    pub fn report(&self, snapshot: &mut Snapshot) {
        if self.is_resolved() {
            snapshot.push(TIME_VECTOR, format_raw(self.value()));
        }
    }
}

/// Shape of a net, used to detect conflicting requests for one name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetShape {
    /// A single bit.
    Scalar,
    /// A bus of the given width.
    Vector(u32),
}

/// A named digital net owned by the registry.
#[derive(Clone, Debug)]
pub enum Net {
    /// A single-bit net.
    Scalar(ScalarNet),
    /// A multi-bit bus.
    Vector(VectorNet),
}

impl Net {
    /// Returns the net name.
    pub fn name(&self) -> &str {
        match self {
            Net::Scalar(n) => n.name(),
            Net::Vector(n) => n.name(),
        }
    }

    /// Returns the drive direction.
    pub fn direction(&self) -> Direction {
        match self {
            Net::Scalar(n) => n.direction(),
            Net::Vector(n) => n.direction(),
        }
    }

    /// Returns the net's shape.
    pub fn shape(&self) -> NetShape {
        match self {
            Net::Scalar(_) => NetShape::Scalar,
            Net::Vector(n) => NetShape::Vector(n.width()),
        }
    }

    /// Drives an unsigned value; for buses bit 0 goes to subnet 0.
    pub fn set_value(&mut self, value: u64) {
        match self {
            Net::Scalar(n) => n.set_value(value),
            Net::Vector(n) => n.set_value(value),
        }
    }

    /// Drives a textual value: a binary digit for scalars, a tagged
    /// `b...`/`x...` string for buses.
    pub fn set_str(&mut self, value: &str) -> Result<(), BenchError> {
        match self {
            Net::Scalar(n) => n.set_str(value),
            Net::Vector(n) => n.set_str(value),
        }
    }

    /// Resolves sample indices for a new run.
    pub fn resolve(&mut self, table: &VectorTable) {
        match self {
            Net::Scalar(n) => {
                n.resolve(table);
            }
            Net::Vector(n) => n.resolve(table),
        }
    }

    /// Re-evaluates the digitized state and returns whether it changed.
    pub fn evaluate(&mut self, samples: &[f64]) -> Result<bool, BenchError> {
        match self {
            Net::Scalar(n) => n.evaluate(samples),
            Net::Vector(n) => n.evaluate(samples),
        }
    }

    /// Adds this net's current state to the snapshot.
    pub fn report(&self, snapshot: &mut Snapshot) {
        match self {
            Net::Scalar(n) => n.report(snapshot),
            Net::Vector(n) => n.report(snapshot),
        }
    }

    /// Returns the port continuation lines for this net, in port order.
    pub fn port_lines(&self) -> Vec<String> {
        match self {
            Net::Scalar(n) => vec![n.port_line()],
            Net::Vector(n) => n.port_order().into_iter().map(|s| format!("+{s}")).collect(),
        }
    }

    /// Returns one pulse source line per bit, in bit order.
    pub fn pulse_lines(&self, duration: &str) -> Vec<String> {
        match self {
            Net::Scalar(n) => vec![n.pulse_line(duration)],
            Net::Vector(n) => n
                .subnets()
                .iter()
                .map(|sub| sub.pulse_line(duration))
                .collect(),
        }
    }

    /// Returns the names of the single-bit signals this net covers.
    pub fn bit_names(&self) -> Vec<&str> {
        match self {
            Net::Scalar(n) => vec![n.name()],
            Net::Vector(n) => n.subnets().iter().map(ScalarNet::name).collect(),
        }
    }

    /// Returns the external source lines for this net's driven bits.
    pub fn drive_source_lines(&self) -> Vec<String> {
        match self {
            Net::Scalar(n) => n.drive_source_line().into_iter().collect(),
            Net::Vector(n) => n.drive_source_lines(),
        }
    }
}
