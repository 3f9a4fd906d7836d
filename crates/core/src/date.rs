//! Canonical calendar-date key.
//!
//! Every stored `date` field is an ISO-8601 calendar date (`YYYY-MM-DD`) in UTC with
//! no time of day. Older records may carry a `toDateString()` style value
//! (`"Mon Oct 19 2026"`) or a full timestamp; those are normalized on read and always
//! written back in the canonical form.

use core::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::value_object::ValueObject;

const ISO_FORMAT: &str = "%Y-%m-%d";
const LEGACY_DATE_STRING_FORMAT: &str = "%a %b %d %Y";

/// A calendar date used to bucket ledger entries by day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// UTC calendar date of an instant.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.date_naive())
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// The day before this one.
    pub fn previous(&self) -> Self {
        Self(self.0 - Duration::days(1))
    }

    /// Parse any stored date representation (canonical, legacy or timestamp).
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if let Ok(d) = NaiveDate::parse_from_str(s, ISO_FORMAT) {
            return Ok(Self(d));
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(at.with_timezone(&Utc).date_naive()));
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, LEGACY_DATE_STRING_FORMAT) {
            return Ok(Self(d));
        }
        Err(DomainError::validation(
            "date",
            format!("unrecognized date `{s}`"),
        ))
    }

    /// Human label relative to `today`. Display-only; never persisted.
    pub fn display_label(&self, today: DateKey) -> String {
        if *self == today {
            "Today".to_string()
        } else if *self == today.previous() {
            "Yesterday".to_string()
        } else {
            self.0.format("%b %-d, %Y").to_string()
        }
    }
}

impl ValueObject for DateKey {}

impl core::fmt::Display for DateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}
