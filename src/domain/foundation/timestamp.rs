//! Timestamp value object wrapping UTC datetimes.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wraps an existing datetime.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Builds a timestamp from a Unix epoch in seconds.
    ///
    /// Out-of-range values (provider clock corruption) fall back to the
    /// Unix epoch rather than panicking.
    pub fn from_unix(secs: i64) -> Self {
        match Utc.timestamp_opt(secs, 0) {
            chrono::LocalResult::Single(dt) => Self(dt),
            _ => Self(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    /// Returns the inner datetime.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Returns the Unix epoch seconds.
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }

    /// Returns a timestamp `days` days later.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + chrono::Duration::days(days))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
