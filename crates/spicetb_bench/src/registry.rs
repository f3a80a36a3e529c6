//! Session-wide ownership of nets and per-run index resolution.
//!
//! The engine announces every run with a list of [`VectorInfo`]s. The
//! registry turns them into a [`VectorTable`] and re-resolves every net, so
//! indices from a previous run are never used against a new sample layout.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BenchError;
use crate::levels::LogicLevels;
use crate::net::{Direction, Net, NetShape, ScalarNet, TimeNet, TIME_VECTOR};
use crate::report::Snapshot;
use crate::vector::VectorNet;

/// One result vector announced at run initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorInfo {
    /// Vector name as the engine knows it.
    pub name: String,
    /// Position of the vector's value in every sample batch.
    pub index: usize,
    /// Number of samples the engine has allocated for the vector.
    pub length: usize,
}

/// Name to sample-index mapping for one run.
#[derive(Clone, Debug, Default)]
pub struct VectorTable {
    indices: HashMap<String, usize>,
}

impl VectorTable {
    /// Builds a table from the run's vector descriptions.
    pub fn from_infos<I: IntoIterator<Item = VectorInfo>>(infos: I) -> Self {
        Self {
            indices: infos.into_iter().map(|info| (info.name, info.index)).collect(),
        }
    }

    /// Returns the sample index of `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Returns the number of vectors in the run.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the run announced no vectors.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Where an input bit lives inside the registry.
#[derive(Clone, Debug)]
struct DriveRef {
    net: String,
    bit: Option<usize>,
}

/// Owns every net of a session, keyed by unique name.
pub struct NetRegistry {
    levels: LogicLevels,
    time: TimeNet,
    nets: BTreeMap<String, Net>,
    drive_refs: HashMap<String, DriveRef>,
    table: VectorTable,
}

impl NetRegistry {
    /// Creates an empty registry holding only the time net.
    pub fn new(levels: LogicLevels) -> Self {
        Self {
            levels,
            time: TimeNet::new(levels),
            nets: BTreeMap::new(),
            drive_refs: HashMap::new(),
            table: VectorTable::default(),
        }
    }

    /// Returns the session's logic levels.
    pub fn levels(&self) -> LogicLevels {
        self.levels
    }

    /// Returns the scalar net `name`, creating it on first request.
    pub fn scalar(&mut self, name: &str, direction: Direction) -> Result<&mut Net, BenchError> {
        self.lookup_or_create(name, NetShape::Scalar, direction)
    }

    /// Returns the `width`-bit bus `name`, creating it on first request.
    pub fn vector(
        &mut self,
        name: &str,
        width: u32,
        direction: Direction,
    ) -> Result<&mut Net, BenchError> {
        self.lookup_or_create(name, NetShape::Vector(width), direction)
    }

    fn lookup_or_create(
        &mut self,
        name: &str,
        shape: NetShape,
        direction: Direction,
    ) -> Result<&mut Net, BenchError> {
        if name == TIME_VECTOR {
            return Err(BenchError::NetRedefined {
                name: name.to_string(),
            });
        }
        if let Some(existing) = self.nets.get(name) {
            if existing.shape() != shape || existing.direction() != direction {
                return Err(BenchError::NetRedefined {
                    name: name.to_string(),
                });
            }
        } else {
            let net = match shape {
                NetShape::Scalar => Net::Scalar(ScalarNet::new(name, direction, self.levels)),
                NetShape::Vector(width) => {
                    Net::Vector(VectorNet::new(name, width, direction, self.levels)?)
                }
            };
            if let Some(clash) = self.bit_name_clash(&net) {
                return Err(BenchError::NetRedefined { name: clash });
            }
            if direction == Direction::Input {
                self.index_drive_refs(&net);
            }
            self.nets.insert(name.to_string(), net);
        }
        self.nets
            .get_mut(name)
            .ok_or_else(|| BenchError::UnknownNet(name.to_string()))
    }

    /// Returns a single-bit name `net` shares with an existing net, such as
    /// scalar `d0` against subnet `d0` of bus `d`.
    fn bit_name_clash(&self, net: &Net) -> Option<String> {
        let names = net.bit_names();
        self.nets
            .values()
            .flat_map(Net::bit_names)
            .find(|existing| names.contains(existing))
            .map(str::to_string)
    }

    fn index_drive_refs(&mut self, net: &Net) {
        let owner = net.name().to_string();
        match net {
            Net::Scalar(n) => {
                self.drive_refs.insert(
                    n.name().to_string(),
                    DriveRef {
                        net: owner,
                        bit: None,
                    },
                );
            }
            Net::Vector(v) => {
                for (i, sub) in v.subnets().iter().enumerate() {
                    self.drive_refs.insert(
                        sub.name().to_string(),
                        DriveRef {
                            net: owner.clone(),
                            bit: Some(i),
                        },
                    );
                }
            }
        }
    }

    /// Returns the net `name`.
    pub fn get(&self, name: &str) -> Option<&Net> {
        self.nets.get(name)
    }

    /// Returns the net `name` for driving.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Net> {
        self.nets.get_mut(name)
    }

    /// Iterates over nets in name order.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.values()
    }

    /// Returns the voltage to inject for the input scalar or input subnet
    /// called `name`.
    pub fn drive_value(&self, name: &str) -> Option<f64> {
        let drive = self.drive_refs.get(name)?;
        match (self.nets.get(&drive.net)?, drive.bit) {
            (Net::Scalar(n), None) => Some(n.drive_value()),
            (Net::Vector(v), Some(bit)) => v.subnets().get(bit).map(ScalarNet::drive_value),
            _ => None,
        }
    }

    /// Returns the time of the last evaluated sample.
    pub fn sim_time(&self) -> f64 {
        self.time.value()
    }

    /// Returns the mapping of the current run.
    pub fn table(&self) -> &VectorTable {
        &self.table
    }

    /// Rebuilds the name to index mapping for a new run and resolves every net.
    pub fn resolve<I: IntoIterator<Item = VectorInfo>>(&mut self, infos: I) {
        self.table = VectorTable::from_infos(infos);
        debug!(vectors = self.table.len(), nets = self.nets.len(), "resolving nets");
        if self.table.is_empty() {
            warn!("run announced no vectors, every net is inert");
        }
        self.time.resolve(&self.table);
        for net in self.nets.values_mut() {
            net.resolve(&self.table);
        }
    }

    /// Evaluates every net against one sample batch.
    ///
    /// Returns true if any net changed. The time net is read but never
    /// counts as a change.
    pub fn evaluate(&mut self, samples: &[f64]) -> Result<bool, BenchError> {
        self.time.evaluate(samples)?;
        let mut changed = false;
        for net in self.nets.values_mut() {
            changed |= net.evaluate(samples)?;
        }
        Ok(changed)
    }

    /// Builds a snapshot: time first, then every net in name order.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        self.time.report(&mut snapshot);
        for net in self.nets.values() {
            net.report(&mut snapshot);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infos(names: &[&str]) -> Vec<VectorInfo> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| VectorInfo {
                name: n.to_string(),
                index: i,
                length: 16,
            })
            .collect()
    }

    #[test]
    fn lookup_or_create_is_idempotent() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.scalar("clk", Direction::Input).unwrap();
        reg.scalar("clk", Direction::Input).unwrap().set_value(1);
        assert_eq!(reg.nets().count(), 1);
        assert_eq!(reg.drive_value("clk"), Some(1.8));
    }

    #[test]
    fn shape_conflict_rejected() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.vector("d", 4, Direction::Input).unwrap();
        assert!(matches!(
            reg.vector("d", 8, Direction::Input),
            Err(BenchError::NetRedefined { .. })
        ));
        assert!(matches!(
            reg.scalar("d", Direction::Input),
            Err(BenchError::NetRedefined { .. })
        ));
        assert!(reg.scalar("time", Direction::Output).is_err());
    }

    #[test]
    fn scalar_colliding_with_subnet_rejected() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.vector("d", 2, Direction::Input).unwrap().set_value(0b01);
        assert!(matches!(
            reg.scalar("d0", Direction::Input),
            Err(BenchError::NetRedefined { ref name }) if name == "d0"
        ));
        assert_eq!(reg.drive_value("d0"), Some(1.8));
        assert!(reg.get("d0").is_none());
    }

    #[test]
    fn subnet_colliding_with_scalar_rejected() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.scalar("a1", Direction::Input).unwrap().set_value(1);
        assert!(matches!(
            reg.vector("a", 4, Direction::Output),
            Err(BenchError::NetRedefined { .. })
        ));
        assert!(reg.get("a").is_none());
        assert_eq!(reg.drive_value("a1"), Some(1.8));
        reg.vector("a", 1, Direction::Input).unwrap();
        assert_eq!(reg.nets().count(), 2);
    }

    #[test]
    fn drive_value_reaches_vector_subnets() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.vector("a", 3, Direction::Input)
            .unwrap()
            .set_str("b100")
            .unwrap();
        assert_eq!(reg.drive_value("a0"), Some(0.0));
        assert_eq!(reg.drive_value("a2"), Some(1.8));
        assert_eq!(reg.drive_value("a"), None);
    }

    #[test]
    fn outputs_have_no_drive_value() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.scalar("q", Direction::Output).unwrap();
        assert_eq!(reg.drive_value("q"), None);
    }

    #[test]
    fn evaluate_and_snapshot() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.scalar("b", Direction::Output).unwrap();
        reg.vector("a", 2, Direction::Output).unwrap();
        reg.resolve(infos(&["time", "a0", "a1", "b"]));

        assert!(reg.evaluate(&[0.0, 1.8, 0.0, 0.0]).unwrap());
        assert_eq!(
            reg.snapshot().to_string(),
            "time=0.000000e+00 a=1 b=0"
        );
        assert!(!reg.evaluate(&[1e-9, 1.8, 0.0, 0.0]).unwrap());
        assert!(reg.evaluate(&[2e-9, 1.8, 1.8, 0.0]).unwrap());
        assert_eq!(reg.sim_time(), 2e-9);
        assert_eq!(
            reg.snapshot().to_string(),
            "time=2.000000e-09 a=3 b=0"
        );
    }

    #[test]
    fn unresolved_nets_are_skipped() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.scalar("ghost", Direction::Output).unwrap();
        reg.scalar("b", Direction::Output).unwrap();
        reg.resolve(infos(&["time", "b"]));
        assert!(reg.evaluate(&[0.0, 1.8]).unwrap());
        assert_eq!(reg.snapshot().get("ghost"), None);
        assert_eq!(reg.snapshot().get("b"), Some("1"));
    }

    #[test]
    fn resolve_rebuilds_indices_per_run() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.scalar("b", Direction::Output).unwrap();
        reg.resolve(infos(&["time", "b"]));
        reg.evaluate(&[0.0, 1.8]).unwrap();
        reg.resolve(infos(&["b", "time"]));
        assert_eq!(reg.table().index_of("b"), Some(0));
        assert!(reg.evaluate(&[1.8, 5e-9]).unwrap());
        assert_eq!(reg.sim_time(), 5e-9);
    }

    #[test]
    fn short_sample_batch_is_fatal() {
        let mut reg = NetRegistry::new(LogicLevels::default());
        reg.scalar("b", Direction::Output).unwrap();
        reg.resolve(infos(&["time", "b"]));
        assert!(matches!(
            reg.evaluate(&[0.0]),
            Err(BenchError::IndexOutOfRange { .. })
        ));
    }
}
