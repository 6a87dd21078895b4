//! Ledger timestamps
//!
//! Timestamps are stored as ISO-8601 UTC strings in one fixed-width form,
//! `YYYY-MM-DDTHH:MM:SS.ffffffZ`, so that comparing the strings compares
//! the instants. [`Timestamp::parse`] accepts the looser forms a person
//! types (`2025-12-25T21:30:00`, RFC 3339 with an offset) and normalizes
//! them into the stored form before any comparison.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// A point in time, stored in canonical string form.
///
/// Ordering is lexicographic on the canonical string, which equals
/// chronological order for timestamps produced by this type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Canonical timestamp for a UTC instant.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Timestamp(dt.format(CANONICAL_FORMAT).to_string())
    }

    /// Parse user-supplied text into canonical form.
    ///
    /// Naive date-times (no offset) are taken as UTC.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::from_datetime(dt.with_timezone(&Utc)));
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(Self::from_datetime(Utc.from_utc_datetime(&naive)));
            }
        }
        Err(ParseError::InvalidTimestamp(text.to_string()))
    }

    /// The stored string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Timestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}
