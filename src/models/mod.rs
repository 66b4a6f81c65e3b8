//! Transport-level records exchanged with the backend.
//!
//! Field names on the wire are the backend's; Rust names are English and
//! mapped with `#[serde(rename)]`. The client never owns these records, it
//! only caches the latest server response.

pub mod doctor;
pub mod enums;
pub mod job;
pub mod local;
pub mod medication;
pub mod patient;
pub mod prescription;

pub use doctor::*;
pub use enums::*;
pub use job::*;
pub use local::*;
pub use medication::*;
pub use patient::*;
pub use prescription::*;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid {field} value: {value:?}")]
    InvalidEnum { field: String, value: String },
}

/// Deserialize `null` as the type's default (backend columns are nullable).
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize `null`, `""` and whitespace as `None`, anything else via `FromStr`.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// `None` for blank form input, the trimmed value otherwise.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a backend timestamp: RFC 3339 with offset, or naive ISO-8601 with
/// optional fractional seconds (what the backend emits for UTC columns).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Day/month/year display of a backend timestamp; the raw value when unparseable.
pub fn display_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}
