//! # Temporal Types — MPH Processing Dates
//!
//! The Main Product Header records when a product was generated in
//! `eop:processingDate` as `YYYY-MM-DDTHH:MM:SSZ`. The same instant is
//! embedded in the product directory name as a count of seconds since
//! 2000-01-01T00:00:00, written in base 36 (see [`crate::compact`]).
//!
//! The trailing `Z` is a literal: processing dates are UTC by convention and
//! no other offset is accepted.

use chrono::{DateTime, NaiveDateTime, TimeDelta};

use crate::error::DateError;

/// `strftime` pattern of MPH processing dates.
pub const PROCESSING_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// 2000-01-01T00:00:00Z as a Unix timestamp.
pub const EPOCH_UNIX_SECONDS: i64 = 946_684_800;

/// The reference instant compact creation dates are counted from.
pub fn epoch() -> NaiveDateTime {
    DateTime::UNIX_EPOCH.naive_utc() + TimeDelta::seconds(EPOCH_UNIX_SECONDS)
}

/// A processing date with seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessingDate(NaiveDateTime);

impl ProcessingDate {
    /// Parse a `YYYY-MM-DDTHH:MM:SSZ` string.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Malformed`] for anything else, including
    /// fractional seconds and explicit offsets such as `+00:00`.
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDateTime::parse_from_str(s, PROCESSING_DATE_FORMAT)
            .map(Self)
            .map_err(|e| DateError::Malformed {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// The date lying `seconds` after the epoch.
    pub fn from_epoch_offset(seconds: i64) -> Result<Self, DateError> {
        TimeDelta::try_seconds(seconds)
            .and_then(|delta| epoch().checked_add_signed(delta))
            .map(Self)
            .ok_or(DateError::OutOfRange { seconds })
    }

    /// Elapsed time since the epoch (negative before 2000).
    pub fn since_epoch(&self) -> TimeDelta {
        self.0.signed_duration_since(epoch())
    }

    /// Access the inner naive datetime.
    pub fn as_datetime(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl std::fmt::Display for ProcessingDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(PROCESSING_DATE_FORMAT))
    }
}
