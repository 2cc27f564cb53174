//! Strict date/time parsing.
//!
//! Unlike lenient parsers that fall back to "now" or the epoch, every entry
//! point here returns a [`ParseError`] when the text is not a date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::ParseError;

/// Layouts with both a date and a time of day, interpreted as UTC.
const DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight UTC.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Parses `text` as a date/time, normalized to UTC.
///
/// Accepts RFC 3339 and RFC 2822 timestamps (honoring their offsets), plus
/// the common `YYYY-MM-DD[ HH:MM[:SS]]`, `MM/DD/YYYY[ HH:MM[:SS]]` and
/// long-month layouts, which are taken as UTC. Surrounding whitespace is
/// ignored.
///
/// # Errors
///
/// Returns [`ParseError`] if `text` matches none of the accepted layouts or
/// names an impossible date.
///
/// # Examples
///
/// ```
/// use safe_input::parse_strict;
///
/// let t = parse_strict("2014-01-01 00:00:00").unwrap();
/// assert_eq!(t.to_rfc3339(), "2014-01-01T00:00:00+00:00");
///
/// assert!(parse_strict("bogus date here.").is_err());
/// ```
pub fn parse_strict(text: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = text.trim();
    match parse_layouts(trimmed) {
        Some(parsed) => Ok(parsed),
        None => {
            tracing::warn!(len = text.len(), "unparseable date/time");
            Err(ParseError::new(text))
        }
    }
}

fn parse_layouts(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(text) {
        return Some(t.with_timezone(&Utc));
    }
    for layout in DATE_TIME_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc());
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(text, layout) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn parses_sql_style_timestamp() {
        let t = parse_strict("2014-01-01 00:00:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_prose() {
        let err = parse_strict("bogus date here.").unwrap_err();
        assert_eq!(err.to_string(), "unparseable date/time (16 bytes)");
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(parse_strict("").is_err());
        assert!(parse_strict("   ").is_err());
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(parse_strict("2014-02-30").is_err());
        assert!(parse_strict("2014-13-01 00:00:00").is_err());
        assert!(parse_strict("2014-01-01 25:00:00").is_err());
    }

    #[test]
    fn honors_offsets() {
        let t = parse_strict("2014-01-01T10:00:00-08:00").unwrap();
        assert_eq!(t.hour(), 18);

        let t = parse_strict("Wed, 01 Jan 2014 10:00:00 +0100").unwrap();
        assert_eq!(t.hour(), 9);
    }

    #[test]
    fn accepts_date_only_layouts() {
        for text in ["2014-04-21", "04/21/2014", "April 21, 2014", "21 April 2014"] {
            let t = parse_strict(text).unwrap_or_else(|_| panic!("{} should parse", text));
            assert_eq!((t.year(), t.month(), t.day()), (2014, 4, 21));
            assert_eq!(t.hour(), 0);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert!(parse_strict("  2014-01-01 08:30  ").is_ok());
    }
}
