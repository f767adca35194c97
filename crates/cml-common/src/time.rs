//! Strict ISO-8601 UTC time handling.
//!
//! The canonical on-the-wire form everywhere in this system is
//! `YYYY-MM-DDTHH:MM:SSZ`: UTC only, no sub-second precision, no other
//! offsets. Timestamps convert losslessly to and from epoch seconds.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::CmlError;

const ISO_Z_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` string into a UTC instant.
///
/// Any other offset or precision is rejected.
pub fn parse_iso_utc(s: &str) -> Result<DateTime<Utc>, CmlError> {
    let naive = NaiveDateTime::parse_from_str(s, ISO_Z_FORMAT)
        .map_err(|_| CmlError::InvalidTime(s.to_string()))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Format a UTC instant in the canonical `YYYY-MM-DDTHH:MM:SSZ` form.
pub fn format_iso_utc(ts: DateTime<Utc>) -> String {
    ts.format(ISO_Z_FORMAT).to_string()
}

/// Seconds since the Unix epoch for a UTC instant.
pub fn epoch_seconds(ts: DateTime<Utc>) -> i64 {
    ts.timestamp()
}

/// UTC instant from epoch seconds. None if out of chrono's range.
pub fn from_epoch_seconds(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_roundtrip() {
        let s = "2024-03-01T12:15:00Z";
        let ts = parse_iso_utc(s).unwrap();
        assert_eq!(format_iso_utc(ts), s);
    }

    #[test]
    fn test_epoch_roundtrip() {
        let ts = parse_iso_utc("2024-03-01T12:15:00Z").unwrap();
        let secs = epoch_seconds(ts);
        assert_eq!(from_epoch_seconds(secs), Some(ts));
    }

    #[test]
    fn test_rejects_other_offsets() {
        assert!(parse_iso_utc("2024-03-01T12:15:00+02:00").is_err());
        assert!(parse_iso_utc("2024-03-01T12:15:00").is_err());
        assert!(parse_iso_utc("2024-03-01T12:15:00.500Z").is_err());
        assert!(parse_iso_utc("2024-03-01").is_err());
    }
}
