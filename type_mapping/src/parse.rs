//! Lenient text parsing
//!
//! Numeric parsing follows the loose prefix convention of the host ecosystem:
//! the longest numeric prefix wins and text without one reads as zero.
//! Date and time parsing accept the common textual layouts and never fail
//! loudly; anything unparseable is `None`.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::str::FromStr;

/// Timezone naive time strings are interpreted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultTimezone {
    #[default]
    Utc,
    Local,
}

impl DefaultTimezone {
    /// Resolve a wall-clock time in this timezone to UTC
    pub fn resolve(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            DefaultTimezone::Utc => Some(Utc.from_utc_datetime(naive)),
            DefaultTimezone::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc)),
        }
    }

    /// Calendar date of a point in time, as seen in this timezone
    pub fn date_of(&self, time: &DateTime<Utc>) -> NaiveDate {
        match self {
            DefaultTimezone::Utc => time.date_naive(),
            DefaultTimezone::Local => time.with_timezone(&Local).date_naive(),
        }
    }
}

impl FromStr for DefaultTimezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(DefaultTimezone::Utc),
            "local" => Ok(DefaultTimezone::Local),
            other => Err(format!("unknown default timezone '{}'", other)),
        }
    }
}

/// Field order used for ambiguous numeric dates such as `01/02/2024`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    #[default]
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

impl FromStr for DateOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dmy" => Ok(DateOrder::DayMonthYear),
            "mdy" => Ok(DateOrder::MonthDayYear),
            "ymd" => Ok(DateOrder::YearMonthDay),
            other => Err(format!("unknown date order '{}'", other)),
        }
    }
}

/// Integer value of the leading numeric prefix (`"12abc"` is 12, `"abc"` is 0)
///
/// Returns `None` only when the digits overflow an `i64`.
pub fn integer_prefix(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return Some(0);
    }

    let digits = &unsigned[..end];
    if negative {
        format!("-{}", digits).parse::<i64>().ok()
    } else {
        digits.parse::<i64>().ok()
    }
}

/// Float value of the leading numeric prefix (`"3.7kg"` is 3.7, `"abc"` is 0.0)
pub fn float_prefix(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if end < len && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < len && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            end = frac_end;
            has_digits = true;
        }
    }

    if !has_digits {
        return 0.0;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < len && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(0.0)
}

/// Parse stored float text, falling back to the lenient prefix rule
pub fn parse_float_text(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .unwrap_or_else(|_| float_prefix(text))
}

const OFFSET_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M %z",
    "%Y-%m-%dT%H:%M%z",
    "%Y/%m/%d %H:%M:%S%.f %z",
];

const NAIVE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", " Z", "Z"];

const TEXT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%a, %d %b %Y",
    "%a %b %d %Y",
    "%A, %B %d, %Y",
];

const DMY_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const MDY_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];
const YMD_FORMATS: &[&str] = &["%Y %m %d"];

/// `0000-00-00` style values are placeholders, not dates
fn is_zero_date(text: &str) -> bool {
    let digits: String = text
        .chars()
        .take(10)
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.len() == 8 && digits.bytes().all(|b| b == b'0')
}

/// Parse a calendar date without falling back to time layouts
fn parse_date_only(text: &str, order: DateOrder) -> Option<NaiveDate> {
    // Compact YYYYMMDD
    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        let year = text[0..4].parse().ok()?;
        let month = text[4..6].parse().ok()?;
        let day = text[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let ordered = match order {
        DateOrder::DayMonthYear => DMY_FORMATS,
        DateOrder::MonthDayYear => MDY_FORMATS,
        DateOrder::YearMonthDay => YMD_FORMATS,
    };

    TEXT_DATE_FORMATS
        .iter()
        .chain(ordered.iter())
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Parse a date in any supported layout, including full timestamps
///
/// A timestamp yields the calendar date as written; an embedded offset is
/// not applied first.
pub fn parse_date(text: &str, order: DateOrder) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() || is_zero_date(s) {
        return None;
    }

    parse_date_only(s, order).or_else(|| parse_wall_clock(s, order).map(|naive| naive.date()))
}

fn parse_naive_time(text: &str, order: DateOrder) -> Option<NaiveDateTime> {
    NAIVE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| parse_date_only(text, order).and_then(|date| date.and_hms_opt(0, 0, 0)))
}

fn parse_with_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .or_else(|| {
            OFFSET_TIME_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(text, format).ok())
        })
        .or_else(|| DateTime::parse_from_rfc2822(text).ok())
}

fn parse_utc_suffixed(text: &str, order: DateOrder) -> Option<NaiveDateTime> {
    UTC_SUFFIXES.iter().find_map(|suffix| {
        text.strip_suffix(suffix)
            .and_then(|rest| parse_naive_time(rest.trim_end(), order))
    })
}

/// Wall-clock time exactly as written, ignoring any offset
fn parse_wall_clock(text: &str, order: DateOrder) -> Option<NaiveDateTime> {
    parse_with_offset(text)
        .map(|time| time.naive_local())
        .or_else(|| parse_utc_suffixed(text, order))
        .or_else(|| parse_naive_time(text, order))
}

/// Parse a point in time, honoring any offset embedded in the text
///
/// Text carrying an offset is shifted to UTC by that offset. Text without one
/// is read as wall-clock time in `timezone`.
pub fn parse_time(text: &str, order: DateOrder, timezone: DefaultTimezone) -> Option<DateTime<Utc>> {
    let s = text.trim();
    if s.is_empty() || is_zero_date(s) {
        return None;
    }

    if let Some(time) = parse_with_offset(s) {
        return Some(time.with_timezone(&Utc));
    }

    if let Some(naive) = parse_utc_suffixed(s, order) {
        return Some(Utc.from_utc_datetime(&naive));
    }

    parse_naive_time(s, order).and_then(|naive| timezone.resolve(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_integer_prefix() {
        assert_eq!(integer_prefix("42"), Some(42));
        assert_eq!(integer_prefix("  -17 apples"), Some(-17));
        assert_eq!(integer_prefix("+8"), Some(8));
        assert_eq!(integer_prefix("12abc"), Some(12));
        assert_eq!(integer_prefix("3.9"), Some(3));
        assert_eq!(integer_prefix("abc"), Some(0));
        assert_eq!(integer_prefix(""), Some(0));
        assert_eq!(integer_prefix("99999999999999999999"), None);
    }

    #[test]
    fn test_float_prefix() {
        assert_eq!(float_prefix("3.75kg"), 3.75);
        assert_eq!(float_prefix("-0.5"), -0.5);
        assert_eq!(float_prefix(".5"), 0.5);
        assert_eq!(float_prefix("1e3x"), 1000.0);
        assert_eq!(float_prefix("7."), 7.0);
        assert_eq!(float_prefix("2e"), 2.0);
        assert_eq!(float_prefix("abc"), 0.0);
        assert_eq!(float_prefix(""), 0.0);
    }

    #[test]
    fn test_parse_float_text_accepts_full_forms() {
        assert_eq!(parse_float_text("1.5"), 1.5);
        assert!(parse_float_text("inf").is_infinite());
        assert_eq!(parse_float_text("12 parsecs"), 12.0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let order = DateOrder::DayMonthYear;
        for text in [
            "2024-03-15",
            "2024/03/15",
            "20240315",
            "15 Mar 2024",
            "15 March 2024",
            "March 15, 2024",
            "Mar 15 2024",
            "15/03/2024",
            "2024-03-15 10:20:30",
            "2024-03-15T23:20:30Z",
        ] {
            assert_eq!(parse_date(text, order), Some(expected), "failed for {}", text);
        }
    }

    #[test]
    fn test_parse_date_keeps_written_day_despite_offset() {
        let order = DateOrder::default();
        assert_eq!(
            parse_date("2024-01-15T23:30:00-05:00", order),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024-01-15 00:30:00 +0900", order),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("Mon, 15 Jan 2024 23:30:00 -0500", order),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_parse_date_respects_order() {
        assert_eq!(
            parse_date("01/02/2024", DateOrder::DayMonthYear),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        assert_eq!(
            parse_date("01/02/2024", DateOrder::MonthDayYear),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage_and_zero_dates() {
        let order = DateOrder::default();
        assert_eq!(parse_date("", order), None);
        assert_eq!(parse_date("not a date", order), None);
        assert_eq!(parse_date("2024-02-30", order), None);
        assert_eq!(parse_date("0000-00-00", order), None);
    }

    #[test]
    fn test_parse_time_honors_offsets() {
        let order = DateOrder::default();
        let tz = DefaultTimezone::Utc;
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();

        for text in [
            "2024-01-15T10:00:00+02:00",
            "2024-01-15 10:00:00 +0200",
            "2024-01-15 10:00:00+02:00",
            "2024-01-15 03:00:00 -0500",
            "Mon, 15 Jan 2024 10:00:00 +0200",
            "2024-01-15 08:00:00 UTC",
            "2024-01-15T08:00:00Z",
        ] {
            assert_eq!(parse_time(text, order, tz), Some(expected), "failed for {}", text);
        }
    }

    #[test]
    fn test_parse_time_naive_uses_default_timezone() {
        let order = DateOrder::default();
        let parsed = parse_time("2024-01-15 08:00:00", order, DefaultTimezone::Utc).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap());

        let midnight = parse_time("2024-01-15", order, DefaultTimezone::Utc).unwrap();
        assert_eq!(midnight.hour(), 0);

        let fractional = parse_time("2024-01-15 08:00:00.250", order, DefaultTimezone::Utc).unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_time_zero_and_garbage() {
        let order = DateOrder::default();
        let tz = DefaultTimezone::Utc;
        assert_eq!(parse_time("0000-00-00 00:00:00", order, tz), None);
        assert_eq!(parse_time("", order, tz), None);
        assert_eq!(parse_time("yesterday-ish", order, tz), None);
    }

    #[test]
    fn test_setting_names() {
        assert_eq!("UTC".parse::<DefaultTimezone>(), Ok(DefaultTimezone::Utc));
        assert_eq!("local".parse::<DefaultTimezone>(), Ok(DefaultTimezone::Local));
        assert!("mars".parse::<DefaultTimezone>().is_err());
        assert_eq!("mdy".parse::<DateOrder>(), Ok(DateOrder::MonthDayYear));
        assert!("dym".parse::<DateOrder>().is_err());
    }
}
