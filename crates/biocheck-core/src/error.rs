//! # Error Types
//!
//! Errors raised by the pure building blocks of the checker. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! These are programming-level failures (bad input to a codec, an
//! unparsable timestamp). Product-level findings such as "file size does not
//! match" are not errors in this sense; they are data collected by the
//! reconciliation engine in `biocheck-product`.

use thiserror::Error;

/// Error in the base-36 compact date codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Nothing to decode.
    #[error("empty base-36 value")]
    Empty,

    /// A character outside `0-9A-Z` (case-insensitive).
    #[error("invalid base-36 symbol {symbol:?} in {input:?}")]
    InvalidSymbol {
        /// The offending character.
        symbol: char,
        /// The full input string.
        input: String,
    },

    /// The decoded value does not fit in an `i64`.
    #[error("base-36 value {input:?} is out of range")]
    Overflow {
        /// The full input string.
        input: String,
    },

    /// Only whole seconds can be encoded.
    #[error("number must be an integer (duration has {nanos} ns sub-second part)")]
    NotAnInteger {
        /// The sub-second remainder that made the value non-integral.
        nanos: u32,
    },
}

/// Error parsing or constructing a processing date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The string does not follow `YYYY-MM-DDTHH:MM:SSZ`.
    #[error("time data {value:?} does not match format '%Y-%m-%dT%H:%M:%SZ': {reason}")]
    Malformed {
        /// The rejected input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// An offset from the epoch that cannot be represented as a date.
    #[error("{seconds} seconds past 2000-01-01T00:00:00Z is not a representable date")]
    OutOfRange {
        /// Seconds past the epoch.
        seconds: i64,
    },
}

/// Failure to turn a compact date back into a processing date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompactDateError {
    /// The compact date is not valid base 36.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The decoded offset is not a representable date.
    #[error(transparent)]
    Date(#[from] DateError),
}
