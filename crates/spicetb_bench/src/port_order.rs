//! Port ordering for simulators with prefix-matching net names.
//!
//! The simulator binds subcircuit ports by textual match, and a shorter name
//! matches any longer name it prefixes. Ports must therefore be emitted with
//! every name ahead of its own prefixes: `d10` before `d1`.

use std::cmp::Ordering;

/// Orders two port names: when one is a prefix of the other the longer comes
/// first, otherwise plain lexicographic byte order applies.
///
/// This is a total order. It equals lexicographic order with the end of a
/// string sorting after every character.
pub fn port_order(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    for (x, y) in a.iter().zip(b) {
        match x.cmp(y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    b.len().cmp(&a.len())
}

/// Sorts names into port order in place.
pub fn sort_ports<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| port_order(a.as_ref(), b.as_ref()));
}
