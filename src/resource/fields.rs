//! # Field Inputs
//!
//! Individually named request inputs and their conversion into typed
//! values. Every conversion failure is a `MalformedInput`.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};

use super::errors::{ResourceError, ResourceResult};
use super::record::RecordKey;

/// Named string inputs of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: HashMap<String, String>,
}

impl FieldSet {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn required_str(&self, name: &str) -> ResourceResult<String> {
        self.get(name).map(str::to_string).ok_or_else(|| {
            ResourceError::malformed(format!("Required parameter '{}' is not present", name))
        })
    }

    /// Parse a field with `FromStr`, naming the expected type on failure
    pub fn required_parse<T: FromStr>(&self, name: &str, expected: &str) -> ResourceResult<T> {
        let raw = self.required_str(name)?;
        raw.trim()
            .parse::<T>()
            .map_err(|_| invalid(name, expected, &raw))
    }

    pub fn required_i64(&self, name: &str) -> ResourceResult<i64> {
        self.required_parse(name, "an integer")
    }

    pub fn required_i32(&self, name: &str) -> ResourceResult<i32> {
        self.required_parse(name, "an integer")
    }

    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0`
    pub fn required_bool(&self, name: &str) -> ResourceResult<bool> {
        let raw = self.required_str(name)?;
        parse_bool(&raw).ok_or_else(|| invalid(name, "a boolean", &raw))
    }

    pub fn required_timestamp(&self, name: &str) -> ResourceResult<NaiveDateTime> {
        let raw = self.required_str(name)?;
        parse_timestamp(&raw).ok_or_else(|| invalid(name, "an ISO-8601 date-time", &raw))
    }

    /// Parse the key a new record is stored under; empty keys are rejected
    pub fn key<K: RecordKey>(&self, name: &str) -> ResourceResult<K> {
        let key: K = self.required_parse(name, "a valid key")?;
        if key.is_unassigned() {
            let raw = self.get(name).unwrap_or_default();
            return Err(invalid(name, "a valid key", raw));
        }
        Ok(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn invalid(name: &str, expected: &str, raw: &str) -> ResourceError {
    ResourceError::malformed(format!(
        "Parameter '{}' must be {}, got '{}'",
        name, expected, raw
    ))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parse an ISO-8601 date-time
///
/// Local date-times are taken as-is; inputs carrying an offset are
/// normalised to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<NaiveDateTime>() {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(ts);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Serde adapter accepting every form `parse_timestamp` does
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 date-time '{}'", raw)))
    }
}
