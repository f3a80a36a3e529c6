//! Named result vectors of one completed run.

use serde::{Deserialize, Serialize};

/// One named dense array of real samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultVector {
    /// Vector name, e.g. `time` or a node name.
    pub name: String,
    /// One value per sample index.
    pub samples: Vec<f64>,
}

/// All result vectors produced by one run, in the order they were added.
///
/// Inserting a name twice replaces the earlier samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultVectors {
    vectors: Vec<ResultVector>,
}

impl ResultVectors {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the vector `name`.
    pub fn insert(&mut self, name: impl Into<String>, samples: Vec<f64>) {
        let name = name.into();
        match self.slot(&name) {
            Some(slot) => self.vectors[slot].samples = samples,
            None => self.vectors.push(ResultVector { name, samples }),
        }
    }

    /// Returns the slot of `name`, stable until the next run.
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.vectors.iter().position(|v| v.name == name)
    }

    /// Returns the samples stored at `slot`.
    pub fn samples(&self, slot: usize) -> Option<&[f64]> {
        self.vectors.get(slot).map(|v| v.samples.as_slice())
    }

    /// Returns the samples of `name`.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.slot(name).and_then(|slot| self.samples(slot))
    }

    /// Returns the number of vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns true if no vector has been added.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Iterates over the vectors.
    pub fn iter(&self) -> impl Iterator<Item = &ResultVector> {
        self.vectors.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<f64>)> for ResultVectors {
    fn from_iter<I: IntoIterator<Item = (S, Vec<f64>)>>(iter: I) -> Self {
        let mut vectors = Self::new();
        for (name, samples) in iter {
            vectors.insert(name, samples);
        }
        vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut run = ResultVectors::new();
        run.insert("time", vec![0.0, 1.0]);
        run.insert("a", vec![0.0, 1.8]);
        assert_eq!(run.len(), 2);
        assert_eq!(run.slot("a"), Some(1));
        assert_eq!(run.get("a"), Some(&[0.0, 1.8][..]));
        assert_eq!(run.get("b"), None);
        assert_eq!(run.samples(7), None);
    }

    #[test]
    fn insert_replaces() {
        let mut run: ResultVectors = [("a", vec![1.0])].into_iter().collect();
        run.insert("a", vec![2.0, 3.0]);
        assert_eq!(run.len(), 1);
        assert_eq!(run.get("a"), Some(&[2.0, 3.0][..]));
    }

    #[test]
    fn serde_roundtrip() {
        let run: ResultVectors = [("time", vec![0.0, 1e-9]), ("q", vec![0.0, 1.8])]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&run).unwrap();
        let back: ResultVectors = serde_json::from_str(&json).unwrap();
        assert_eq!(run, back);
    }
}
