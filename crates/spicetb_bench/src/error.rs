//! Testbench error types.
//!
//! Everything that can go wrong while building nets and watches, resolving
//! them against a run, or evaluating sample batches is a variant of
//! [`BenchError`]. Format errors are recoverable by the caller; index and
//! width errors mean the run setup is broken and end the run.

use std::io;

use spicetb_common::FormatError;

/// Errors that can occur during testbench setup or sample evaluation.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// A bit-string value could not be decoded.
    #[error("net {name}: {source}")]
    Format {
        /// The net the value was destined for.
        name: String,
        /// The underlying decode failure.
        #[source]
        source: FormatError,
    },

    /// A resolved sample index lies outside the delivered sample array.
    #[error("{name}: sample index {index} out of range for {len} values")]
    IndexOutOfRange {
        /// The net or watch being evaluated.
        name: String,
        /// The resolved index.
        index: usize,
        /// Length of the delivered sample array.
        len: usize,
    },

    /// A watch was given a different number of vector names than its width.
    #[error("watch {name}: width {expected} does not match {actual} vector names")]
    WidthMismatch {
        /// The watch label.
        name: String,
        /// The configured width.
        expected: u32,
        /// The number of names supplied.
        actual: usize,
    },

    /// A vector net or watch was requested with zero width.
    #[error("{name}: width must be at least 1")]
    InvalidWidth {
        /// The net or watch name.
        name: String,
    },

    /// A net name was requested again with a different shape or direction.
    #[error("net {name} already exists with a different shape or direction")]
    NetRedefined {
        /// The net name.
        name: String,
    },

    /// A referenced net has not been created.
    #[error("unknown net {0}")]
    UnknownNet(String),

    /// The engine requested a value for a source with no matching input net.
    #[error("no input net drives source {0}")]
    UnknownSource(String),

    /// The playback loop was started before its watches were resolved.
    #[error("playback started before watches were resolved")]
    NotResolved,

    /// The simulation engine rejected a command.
    #[error("engine rejected command `{command}`: {reason}")]
    Engine {
        /// The command text.
        command: String,
        /// The engine's explanation.
        reason: String,
    },

    /// Writing to the report stream failed.
    #[error("report I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BenchError {
    /// Wraps a [`FormatError`] with the name of the net it was meant for.
    pub fn format(name: impl Into<String>, source: FormatError) -> Self {
        Self::Format {
            name: name.into(),
            source,
        }
    }
}
