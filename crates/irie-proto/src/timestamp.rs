//! Wire timestamp parsing.
//!
//! The backend emits two formats: live `send_message` frames carry RFC 3339
//! (`time.Now().Format(time.RFC3339)` on the Go side), while history rows
//! come out of a SQL `strftime` as `YYYY-MM-DD HH:MM:SS` with no zone. Both
//! must parse; naive timestamps are taken as UTC. Serialization is always
//! RFC 3339.
//!
//! Usable directly or as a `#[serde(with = "...")]` module on frame fields.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer, de};

use crate::error::ProtocolError;

const SQL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a wire timestamp in either backend format.
///
/// # Errors
///
/// [`ProtocolError::Timestamp`] when the string matches neither format.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, ProtocolError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, SQL_FORMAT) {
        return Ok(naive.and_utc());
    }
    Err(ProtocolError::Timestamp(raw.to_string()))
}

/// Serde serializer for frame fields: always RFC 3339.
///
/// # Errors
///
/// Propagates serializer failures only.
pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339())
}

/// Serde deserializer for frame fields: accepts both wire formats.
///
/// # Errors
///
/// A deserialization error when the field is not a string or matches neither
/// timestamp format.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2024-05-06T12:30:00+03:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 6, 9, 30, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_utc() {
        let ts = parse("2024-05-06T12:30:00Z").unwrap();
        assert_eq!(ts.hour(), 12);
    }

    #[test]
    fn parses_sql_format_as_utc() {
        let ts = parse("2024-05-06 12:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 6, 12, 30, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_err());
        assert!(parse("").is_err());
        assert!(parse("2024-05-06T").is_err());
    }

    #[test]
    fn serializes_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 12, 30, 0).unwrap();
        let json = serde_json::to_string(&WithTs { at: ts }).unwrap();
        assert!(json.contains("2024-05-06T12:30:00"));
        let back: WithTs = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at, ts);
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct WithTs {
        #[serde(with = "crate::timestamp")]
        at: DateTime<Utc>,
    }
}
