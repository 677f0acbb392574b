use crate::error::{InvalidTimestampSnafu, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use snafu::ResultExt;
use std::ops::Sub;

/// An instant with the UTC offset the API reported it in.
#[derive(Debug, Clone, Copy, Ord, Eq, PartialEq, PartialOrd)]
pub struct Timestamp(pub DateTime<FixedOffset>);

impl Timestamp {
    /// Parses an ISO-8601 timestamp. Values without an offset are taken as UTC.
    pub fn parse(field: &'static str, value: &str) -> Result<Timestamp> {
        DateTime::parse_from_rfc3339(value)
            .or_else(|_| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|naive| naive.and_utc().fixed_offset())
            })
            .map(Timestamp)
            .context(InvalidTimestampSnafu { field, value })
    }

    /// How far `self` runs past `other`, zero if it does not.
    pub fn overrun(self, other: Timestamp) -> TimeDelta {
        if self > other {
            self - other
        } else {
            TimeDelta::zero()
        }
    }

    /// `None` when the result falls outside the representable range.
    pub fn checked_add(self, delta: TimeDelta) -> Option<Timestamp> {
        self.0.checked_add_signed(delta).map(Timestamp)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = TimeDelta;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.0.signed_duration_since(rhs.0)
    }
}
