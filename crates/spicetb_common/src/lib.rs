//! Shared foundational types for the spicetb digital testbench.
//!
//! This crate provides the fixed-width [`BitVec`] used for multi-bit nets and
//! watches, together with its compact binary and hexadecimal text codecs.

#![warn(missing_docs)]

pub mod bits;
pub mod error;

pub use bits::{hex_digits_for, BitVec};
pub use error::FormatError;
