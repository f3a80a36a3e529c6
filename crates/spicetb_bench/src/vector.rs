//! Multi-bit buses built from scalar nets.

use spicetb_common::{hex_digits_for, BitVec, FormatError};

use crate::error::BenchError;
use crate::levels::LogicLevels;
use crate::net::{Direction, ScalarNet};
use crate::port_order::sort_ports;
use crate::registry::VectorTable;
use crate::report::Snapshot;

/// An N-bit bus owning one [`ScalarNet`] per bit.
///
/// Subnet `i` is named `<name><i>` and carries bit `i`, bit 0 being the
/// least significant. After every evaluation the cached aggregate mirrors the
/// subnets' digitized values.
#[derive(Clone, Debug)]
pub struct VectorNet {
    name: String,
    direction: Direction,
    nets: Vec<ScalarNet>,
    bits: BitVec,
}

impl VectorNet {
    /// Creates a bus of `width` subnets.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        direction: Direction,
        levels: LogicLevels,
    ) -> Result<Self, BenchError> {
        let name = name.into();
        if width == 0 {
            return Err(BenchError::InvalidWidth { name });
        }
        let nets = (0..width)
            .map(|i| ScalarNet::new(format!("{name}{i}"), direction, levels))
            .collect();
        Ok(Self {
            name,
            direction,
            nets,
            bits: BitVec::new(width),
        })
    }

    /// Returns the bus name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the drive direction shared by every subnet.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the number of bits.
    pub fn width(&self) -> u32 {
        self.nets.len() as u32
    }

    /// Returns the subnets in bit order.
    pub fn subnets(&self) -> &[ScalarNet] {
        &self.nets
    }

    /// Returns the aggregate digitized value.
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    /// Drives the low `width` bits of `value`. Ignored for output buses.
    pub fn set_value(&mut self, value: u64) {
        let bits = BitVec::from_u64(value, self.width());
        self.drive(&bits);
    }

    /// Drives a bit vector of exactly this bus's width.
    pub fn set_bits(&mut self, bits: &BitVec) -> Result<(), BenchError> {
        if bits.width() != self.width() {
            return Err(BenchError::format(
                &self.name,
                FormatError::WidthMismatch {
                    expected: self.width(),
                    actual: bits.width(),
                },
            ));
        }
        self.drive(bits);
        Ok(())
    }

    /// Drives a tagged bit string: `b` followed by exactly `width` binary
    /// digits, or `x` followed by exactly `ceil(width/4)` hex digits.
    ///
    /// Reported lengths include the tag character. Strings are validated for
    /// output buses too; only the drive is skipped.
    pub fn set_str(&mut self, value: &str) -> Result<(), BenchError> {
        let width = self.width();
        let mut chars = value.chars();
        let tag = chars.next();
        let digits = chars.as_str();
        let (expected, decode): (usize, fn(&str, u32) -> Result<BitVec, FormatError>) = match tag
        {
            Some('b') => (width as usize + 1, BitVec::from_binary),
            Some('x') => (hex_digits_for(width) + 1, BitVec::from_hex),
            found => {
                return Err(BenchError::format(
                    &self.name,
                    FormatError::MissingTag { found },
                ));
            }
        };
        let actual = value.chars().count();
        if actual != expected {
            return Err(BenchError::format(
                &self.name,
                FormatError::Length { expected, actual },
            ));
        }
        let bits = decode(digits, width).map_err(|e| BenchError::format(&self.name, e))?;
        self.drive(&bits);
        Ok(())
    }

    fn drive(&mut self, bits: &BitVec) {
        if self.direction != Direction::Input {
            return;
        }
        for (net, bit) in self.nets.iter_mut().zip(bits.iter()) {
            net.set_bit(bit);
        }
    }

    /// Resolves every subnet for a new run.
    pub fn resolve(&mut self, table: &VectorTable) {
        for net in &mut self.nets {
            net.resolve(table);
        }
    }

    /// Evaluates every subnet and rebuilds the aggregate.
    ///
    /// Returns true if any subnet changed.
    pub fn evaluate(&mut self, samples: &[f64]) -> Result<bool, BenchError> {
        let mut changed = false;
        for net in &mut self.nets {
            changed |= net.evaluate(samples)?;
        }
        for (i, net) in self.nets.iter().enumerate() {
            self.bits.set(i as u32, net.logic_value());
        }
        Ok(changed)
    }

    /// Adds `name=<hex>` to the snapshot, unless no subnet resolved.
    pub fn report(&self, snapshot: &mut Snapshot) {
        if self.nets.iter().any(ScalarNet::is_resolved) {
            snapshot.push(&self.name, self.bits.to_hex());
        }
    }

    /// Returns subnet names in the order the simulator must see them as ports.
    ///
    /// Evaluation and bit indexing are unaffected.
    pub fn port_order(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nets.iter().map(ScalarNet::name).collect();
        sort_ports(&mut names);
        names
    }

    /// Returns the external source lines of every subnet, in bit order.
    pub fn drive_source_lines(&self) -> Vec<String> {
        self.nets
            .iter()
            .filter_map(ScalarNet::drive_source_line)
            .collect()
    }
}
