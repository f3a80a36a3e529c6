//! Errors produced when decoding bit-string text.

/// A malformed binary or hexadecimal bit string.
///
/// Lengths are reported in characters, exactly as the caller supplied them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The string does not have the length required by the vector width.
    #[error("bit string of incorrect size: expected {expected} characters, got {actual}")]
    Length {
        /// Required number of characters.
        expected: usize,
        /// Number of characters received.
        actual: usize,
    },

    /// A character is not a digit of the expected radix.
    #[error("invalid character '{digit}' in base-{radix} bit string")]
    InvalidDigit {
        /// The offending character.
        digit: char,
        /// The radix being decoded (2 or 16).
        radix: u32,
    },

    /// A tagged bit string does not start with `b` or `x`.
    #[error("bit string must start with 'b' or 'x', found {}", found.map_or("nothing".to_string(), |c| format!("'{c}'")))]
    MissingTag {
        /// The first character, if any.
        found: Option<char>,
    },

    /// Two bit vectors of different widths were combined.
    #[error("bit vector width mismatch: expected {expected}, got {actual}")]
    WidthMismatch {
        /// Required width.
        expected: u32,
        /// Supplied width.
        actual: u32,
    },
}
