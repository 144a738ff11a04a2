//! JSON encoding and decoding for request and response bodies
//!
//! Response records opt into lenient dates through
//! `canvas_domain::utils::iso8601`, so decoding here is plain serde. Bodies
//! are written with sorted object keys.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to encode body: {0}")]
    Encode(String),

    /// The payload decoded but reported an error of its own (GraphQL)
    #[error("{0}")]
    Remote(String),
}

/// Decode a response body. An empty body decodes as JSON `null`, so `()`,
/// `Option<T>` and [`crate::NoContent`] work for 204 responses.
pub fn decode_json<T: DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    let payload: &[u8] = if data.iter().all(u8::is_ascii_whitespace) { b"null" } else { data };
    serde_json::from_slice(payload).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Encode a body with object keys in sorted order.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    // Value maps are ordered, so going through Value sorts nested keys too.
    let value = serde_json::to_value(value).map_err(|e| CodecError::Encode(e.to_string()))?;
    serde_json::to_vec(&value).map_err(|e| CodecError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct DateHaver {
        #[serde(with = "canvas_domain::utils::iso8601")]
        date: DateTime<Utc>,
    }

    #[derive(Serialize)]
    struct Unsorted {
        zebra: u8,
        apple: u8,
    }

    #[test]
    fn decodes_fractional_and_whole_second_dates() {
        let fractional: DateHaver =
            decode_json(br#"{"date":"2019-06-02T18:07:28.000Z"}"#).unwrap();
        let whole: DateHaver = decode_json(br#"{"date":"2019-06-02T18:07:28Z"}"#).unwrap();
        assert_eq!(fractional, whole);
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = decode_json::<DateHaver>(br#"{"date":"02/06/2019"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn empty_body_decodes_as_null() {
        decode_json::<()>(b"").unwrap();
        let missing: Option<DateHaver> = decode_json(b"  \n").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn encodes_sorted_keys_and_second_precision_dates() {
        let body = encode_json(&Unsorted { zebra: 1, apple: 2 }).unwrap();
        assert_eq!(body, br#"{"apple":2,"zebra":1}"#);

        let date = DateHaver { date: Utc.timestamp_opt(0, 0).unwrap() };
        assert_eq!(encode_json(&date).unwrap(), br#"{"date":"1970-01-01T00:00:00Z"}"#);
    }
}
