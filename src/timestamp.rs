use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::error::{EntryError, Result};

/// Parse an RFC3339 timestamp as sent by the logging API.
///
/// The wire format always carries nine fractional digits
/// (`2024-01-02T03:04:05.123456789Z`). The result is converted to UTC and
/// truncated to microseconds; nothing is rounded.
pub fn parse_rfc3339_nanos(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|source| {
        EntryError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })?;
    Ok(parsed.with_timezone(&Utc).trunc_subsecs(6))
}

/// Format a timestamp with nine fractional digits and a `Z` suffix.
pub fn format_rfc3339_nanos(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn expected() -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 123_456)
            .unwrap();
        Utc.from_utc_datetime(&naive)
    }

    #[test]
    fn truncates_to_microseconds() {
        let ts = parse_rfc3339_nanos("2024-01-02T03:04:05.123456789Z").unwrap();
        assert_eq!(ts, expected());
    }

    #[test]
    fn converts_offsets_to_utc() {
        let ts = parse_rfc3339_nanos("2024-01-02T05:04:05.123456000+02:00").unwrap();
        assert_eq!(ts, expected());
    }

    #[test]
    fn formats_nine_digits() {
        assert_eq!(format_rfc3339_nanos(&expected()), "2024-01-02T03:04:05.123456000Z");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_rfc3339_nanos("yesterday").unwrap_err();
        assert!(matches!(err, EntryError::InvalidTimestamp { ref value, .. } if value == "yesterday"));
    }
}
