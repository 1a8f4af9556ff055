//! HAPI time strings
//!
//! HAPI servers emit restricted ISO 8601 timestamps. Both calendar dates
//! (`YYYY-MM-DD`) and ordinal dates (`YYYY-DDD`) are allowed, the time of day
//! may be truncated at any field, and the trailing `Z` is optional:
//!
//! - `2001`, `2001-03`, `2001-03-04`, `2001-063`
//! - `2001-03-04T05`, `2001-03-04T05:06`, `2001-03-04T05:06:07.890Z`

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Error type for unparseable HAPI time strings
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("'{input}' is not a valid HAPI date")]
    InvalidDate { input: String },

    #[error("'{input}' is not a valid HAPI time of day")]
    InvalidTime { input: String },
}

/// Parse a HAPI time string into a UTC instant
pub fn parse_hapi_time(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = input.trim();
    let body = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };

    let date = parse_date(date_part).ok_or_else(|| TimeParseError::InvalidDate {
        input: input.to_string(),
    })?;

    let time = match time_part {
        Some(time) if !time.is_empty() => {
            parse_time(time).ok_or_else(|| TimeParseError::InvalidTime {
                input: input.to_string(),
            })?
        }
        _ => NaiveTime::MIN,
    };

    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

/// Format an instant the way sample windows are sent in `/data` requests
///
/// Always carries microseconds, e.g. `2001-01-01T00:00:00.000000Z`.
pub fn format_sample_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('-').collect();
    if !parts.iter().all(|p| all_digits(p)) || parts[0].len() != 4 {
        return None;
    }
    let year: i32 = parts[0].parse().ok()?;

    match parts.as_slice() {
        [_] => NaiveDate::from_ymd_opt(year, 1, 1),
        [_, doy] if doy.len() == 3 => NaiveDate::from_yo_opt(year, doy.parse().ok()?),
        [_, month] if month.len() == 2 => NaiveDate::from_ymd_opt(year, month.parse().ok()?, 1),
        [_, month, day] if month.len() == 2 && day.len() == 2 => {
            NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
        }
        _ => None,
    }
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let (hms, fraction) = match s.split_once('.') {
        Some((hms, fraction)) => (hms, Some(fraction)),
        None => (s, None),
    };

    let fields = hms
        .split(':')
        .map(|f| {
            if f.len() == 2 && all_digits(f) {
                f.parse::<u32>().ok()
            } else {
                None
            }
        })
        .collect::<Option<Vec<u32>>>()?;

    let (hour, minute, second) = match fields.as_slice() {
        [h] => (*h, 0, 0),
        [h, m] => (*h, *m, 0),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    let nanos = match fraction {
        None => 0,
        Some(f) if fields.len() == 3 && all_digits(f) => {
            // Sub-nanosecond digits are dropped
            let digits: String = f.chars().take(9).collect();
            format!("{:0<9}", digits).parse().ok()?
        }
        Some(_) => return None,
    };

    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_full_timestamp() {
        assert_eq!(
            parse_hapi_time("2021-01-01T00:00:00Z").unwrap(),
            utc(2021, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_fractional_seconds_are_same_instant() {
        assert_eq!(
            parse_hapi_time("2021-01-01T00:00:00.000Z").unwrap(),
            parse_hapi_time("2021-01-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_parse_fraction() {
        let t = parse_hapi_time("2021-01-01T00:00:00.123456789123Z").unwrap();
        assert_eq!(t.nanosecond(), 123_456_789);
    }

    #[test]
    fn test_parse_truncated_forms() {
        assert_eq!(parse_hapi_time("2001").unwrap(), utc(2001, 1, 1, 0, 0, 0));
        assert_eq!(parse_hapi_time("2001-03").unwrap(), utc(2001, 3, 1, 0, 0, 0));
        assert_eq!(parse_hapi_time("2001-03-04Z").unwrap(), utc(2001, 3, 4, 0, 0, 0));
        assert_eq!(
            parse_hapi_time("2001-03-04T05").unwrap(),
            utc(2001, 3, 4, 5, 0, 0)
        );
        assert_eq!(
            parse_hapi_time("2001-03-04T05:06Z").unwrap(),
            utc(2001, 3, 4, 5, 6, 0)
        );
    }

    #[test]
    fn test_parse_ordinal_date() {
        assert_eq!(
            parse_hapi_time("2001-063T01:02:03Z").unwrap(),
            utc(2001, 3, 4, 1, 2, 3)
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            parse_hapi_time("yesterday"),
            Err(TimeParseError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_hapi_time("2001-02-30"),
            Err(TimeParseError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_hapi_time("2001-01-01T25:00"),
            Err(TimeParseError::InvalidTime { .. })
        ));
        assert!(matches!(
            parse_hapi_time("2001-01-01T00:00.5"),
            Err(TimeParseError::InvalidTime { .. })
        ));
    }

    #[test]
    fn test_format_sample_time() {
        assert_eq!(
            format_sample_time(&utc(2001, 1, 1, 0, 0, 0)),
            "2001-01-01T00:00:00.000000Z"
        );
    }
}
