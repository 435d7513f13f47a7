//! # Compact Creation Date Codec
//!
//! BIOMASS product names end in a six-character "compact creation date":
//! the number of seconds between 2000-01-01T00:00:00 and the product's
//! processing date, written in base 36 with the alphabet `0-9A-Z`.
//!
//! ```text
//! 2023-05-01T12:00:00Z  ->  736_257_600 s  ->  "C6CK00"
//! ```
//!
//! Encoding is most-significant symbol first with no zero padding; zero is
//! the single symbol `"0"` and negative numbers carry a leading `-`.
//! Decoding is the plain positional base-36 parse and accepts lower-case
//! symbols as well.

use chrono::TimeDelta;
use crate::error::{CodecError, CompactDateError};
use crate::temporal::ProcessingDate;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RADIX: u64 = 36;

/// Encode an integer in base 36.
pub fn encode(number: i64) -> String {
    let sign = if number < 0 { "-" } else { "" };
    let mut magnitude = number.unsigned_abs();
    if magnitude < RADIX {
        return format!("{sign}{}", ALPHABET[magnitude as usize] as char);
    }

    let mut digits = Vec::new();
    while magnitude != 0 {
        digits.push(ALPHABET[(magnitude % RADIX) as usize]);
        magnitude /= RADIX;
    }
    digits.reverse();

    let mut out = String::with_capacity(sign.len() + digits.len());
    out.push_str(sign);
    out.extend(digits.into_iter().map(char::from));
    out
}

/// Encode a whole number of seconds in base 36.
///
/// # Errors
///
/// Returns [`CodecError::NotAnInteger`] if `duration` has a sub-second part.
pub fn encode_duration(duration: TimeDelta) -> Result<String, CodecError> {
    let nanos = duration.subsec_nanos();
    if nanos != 0 {
        return Err(CodecError::NotAnInteger {
            nanos: nanos.unsigned_abs(),
        });
    }
    Ok(encode(duration.num_seconds()))
}

/// Decode a base-36 string.
///
/// # Errors
///
/// Returns a [`CodecError`] for empty input, symbols outside `0-9A-Za-z`,
/// or values that do not fit in an `i64`.
pub fn decode(input: &str) -> Result<i64, CodecError> {
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    if digits.is_empty() {
        return Err(CodecError::Empty);
    }

    let overflow = || CodecError::Overflow {
        input: input.to_string(),
    };

    let mut magnitude: i64 = 0;
    for symbol in digits.chars() {
        let value = symbol
            .to_digit(RADIX as u32)
            .ok_or_else(|| CodecError::InvalidSymbol {
                symbol,
                input: input.to_string(),
            })?;
        magnitude = magnitude
            .checked_mul(RADIX as i64)
            .and_then(|m| m.checked_add(i64::from(value)))
            .ok_or_else(overflow)?;
    }

    Ok(if negative { -magnitude } else { magnitude })
}

/// A compact creation date as it appears in a product name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompactDate(String);

impl CompactDate {
    /// Wrap an already-encoded value, e.g. a product name suffix.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Take the compact date from the last six characters of a product
    /// directory name (the whole name if it is shorter).
    pub fn from_product_name(name: &str) -> Self {
        let skip = name.chars().count().saturating_sub(6);
        Self(name.chars().skip(skip).collect())
    }

    /// Encode the seconds between the epoch and `date`.
    pub fn from_processing_date(date: &ProcessingDate) -> Result<Self, CodecError> {
        encode_duration(date.since_epoch()).map(Self)
    }

    /// Decode back into the processing date it stands for.
    pub fn to_processing_date(&self) -> Result<ProcessingDate, CompactDateError> {
        let seconds = decode(&self.0)?;
        Ok(ProcessingDate::from_epoch_offset(seconds)?)
    }

    /// The encoded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompactDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
