use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use tracing::debug;

/// Day bucket key used by every daily series.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Patterns carrying an explicit UTC offset, tried in order.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

// Offset-less patterns, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Parses the timestamp spellings found in exported usage CSV files.
pub struct TimestampParser;

impl TimestampParser {
    /// Parse `s` into a UTC [`DateTime`], trying each known pattern in turn.
    ///
    /// Order:
    /// 1. `date time.fraction` with `+HH:MM`, `+HHMM` or `+HH` offset
    /// 2. `date time.fraction` and `date time` without offset (UTC)
    /// 3. bare `date` (midnight UTC)
    /// 4. RFC 3339, with or without nanoseconds
    ///
    /// Returns `None` for empty or unrecognised input; callers apply their
    /// own fallback.
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }

        if let Some(date) = parse_date(s) {
            return Some(start_of_day(date));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }

        debug!("TimestampParser: unrecognised timestamp \"{}\"", s);
        None
    }

    /// Parse `s`, substituting `fallback` when it is empty or unparsable.
    pub fn parse_or(s: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
        Self::parse(s).unwrap_or(fallback)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Parse a bare `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// 23:59:59 UTC on `date`, the inclusive upper bound for a date-only filter.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + chrono::Duration::seconds(86_399)
}

/// Fixed-width RFC 3339 rendering (`2025-05-20T10:30:00Z`).
///
/// Strings produced here sort lexicographically in chronological order.
pub fn format_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar day key (`%Y-%m-%d`) in UTC.
pub fn date_key(dt: DateTime<Utc>) -> String {
    dt.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_fractional_with_colon_offset() {
        let dt = TimestampParser::parse("2025-05-20 12:30:00.123456+02:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-05-20 10:30:00");
        assert_eq!(dt.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_parse_fractional_with_compact_offset() {
        let dt = TimestampParser::parse("2025-05-20 12:30:00.5-0100").unwrap();
        assert_eq!(dt.format("%H:%M:%S").to_string(), "13:30:00");
    }

    #[test]
    fn test_parse_fractional_with_hour_only_offset() {
        let dt = TimestampParser::parse("2025-05-20 10:30:00.000001+00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-05-20 10:30:00");
    }

    #[test]
    fn test_parse_fractional_without_offset() {
        let dt = TimestampParser::parse("2025-05-20 10:30:00.250").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_whole_seconds() {
        assert_eq!(
            TimestampParser::parse("2025-05-20 10:30:00"),
            Some(utc(2025, 5, 20, 10, 30, 0))
        );
    }

    #[test]
    fn test_parse_bare_date() {
        assert_eq!(
            TimestampParser::parse("2025-05-21"),
            Some(utc(2025, 5, 21, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(
            TimestampParser::parse("2025-05-20T10:30:00Z"),
            Some(utc(2025, 5, 20, 10, 30, 0))
        );
        assert_eq!(
            TimestampParser::parse("2025-05-20T12:30:00+02:00"),
            Some(utc(2025, 5, 20, 10, 30, 0))
        );
    }

    #[test]
    fn test_parse_rfc3339_nanos() {
        let dt = TimestampParser::parse("2025-05-20T10:30:00.123456789Z").unwrap();
        assert_eq!(dt.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(TimestampParser::parse("  2025-05-20  ").is_some());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TimestampParser::parse("").is_none());
        assert!(TimestampParser::parse("not-a-date").is_none());
        assert!(TimestampParser::parse("20/05/2025").is_none());
    }

    #[test]
    fn test_parse_or_uses_fallback() {
        let fallback = utc(2024, 1, 1, 0, 0, 0);
        assert_eq!(TimestampParser::parse_or("bogus", fallback), fallback);
        assert_eq!(TimestampParser::parse_or("", fallback), fallback);
    }

    #[test]
    fn test_end_of_day() {
        let date = parse_date("2025-05-20").unwrap();
        assert_eq!(end_of_day(date), utc(2025, 5, 20, 23, 59, 59));
        assert_eq!(start_of_day(date), utc(2025, 5, 20, 0, 0, 0));
    }

    #[test]
    fn test_format_rfc3339_fixed_width() {
        let dt = TimestampParser::parse("2025-05-20 10:30:00.999").unwrap();
        assert_eq!(format_rfc3339(dt), "2025-05-20T10:30:00Z");
    }

    #[test]
    fn test_format_rfc3339_orders_lexicographically() {
        let a = format_rfc3339(utc(2025, 5, 9, 23, 0, 0));
        let b = format_rfc3339(utc(2025, 5, 10, 1, 0, 0));
        assert!(a < b);
    }

    #[test]
    fn test_date_key() {
        assert_eq!(date_key(utc(2025, 5, 20, 23, 59, 59)), "2025-05-20");
    }
}
