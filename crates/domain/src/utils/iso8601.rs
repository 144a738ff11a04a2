//! Lenient ISO-8601 date handling for Canvas payloads
//!
//! Canvas and the React Native layers emit both `2019-06-02T18:07:28.000Z`
//! and `2025-01-15T10:30:00Z`. Both must parse, and a bad date string is an
//! error rather than a silent default. Use with `#[serde(with = "...")]`.
//!
//! Dates are written back at seconds precision with a `Z` suffix.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const EXTENDED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Parse an ISO-8601 timestamp with or without fractional seconds.
///
/// Falls back to a signed-year format so values such as
/// `-3033-05-31T07:51:58Z` do not fail the whole payload.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    let normalized = match value.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => value.to_string(),
    };
    DateTime::parse_from_str(&normalized, EXTENDED_FORMAT).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Render a timestamp the way request bodies expect it.
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("expected ISO8601-formatted date, got {raw:?}"))
    })
}

/// Same rules for optional fields; `null` and a missing key both map to `None`.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&super::format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("expected ISO8601-formatted date, got {raw:?}"))
            }),
            None => Ok(None),
        }
    }
}
