//! Type coercion
//!
//! Raw input assigned to a field is coerced into the declared type before it
//! is serialized. Coercion is lenient: unusable input becomes `None` instead
//! of an error.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use std::fmt;

use crate::parse::{float_prefix, integer_prefix, parse_date, parse_time, DateOrder, DefaultTimezone};
use crate::types::{DataType, HstoreValue};

const TRUE_TOKENS: &[&str] = &["1", "t", "true", "on", "y", "yes"];

/// Settings that influence how text is read as dates and times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastOptions {
    pub default_timezone: DefaultTimezone,
    pub date_order: DateOrder,
}

impl CastOptions {
    pub fn new(default_timezone: DefaultTimezone, date_order: DateOrder) -> Self {
        Self {
            default_timezone,
            date_order,
        }
    }
}

/// Coerces raw values into the in-memory type of a declared field
pub trait TypeCast: Send + Sync + fmt::Debug {
    fn cast(&self, data_type: DataType, value: HstoreValue) -> Option<HstoreValue>;
}

/// The canonical coercion rules
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTypeCast {
    options: CastOptions,
}

impl StandardTypeCast {
    pub fn new(options: CastOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CastOptions {
        self.options
    }

    fn integer_cast(&self, value: HstoreValue) -> Option<i64> {
        match value {
            HstoreValue::Integer(i) => Some(i),
            HstoreValue::String(s) if s.trim().is_empty() => None,
            HstoreValue::String(s) => integer_prefix(&s),
            HstoreValue::Float(f) => float_to_integer(f),
            HstoreValue::Boolean(b) => Some(b as i64),
            HstoreValue::Time(t) => Some(t.timestamp()),
            HstoreValue::Date(_) | HstoreValue::Array(_) | HstoreValue::Hash(_) => None,
        }
    }

    fn float_cast(&self, value: HstoreValue) -> Option<f64> {
        match value {
            HstoreValue::Float(f) => Some(f),
            HstoreValue::Integer(i) => Some(i as f64),
            HstoreValue::String(s) => Some(float_prefix(&s)),
            HstoreValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
            HstoreValue::Time(t) => {
                Some(t.timestamp() as f64 + t.timestamp_subsec_nanos() as f64 / 1e9)
            }
            HstoreValue::Date(_) | HstoreValue::Array(_) | HstoreValue::Hash(_) => None,
        }
    }

    fn boolean_cast(&self, value: HstoreValue) -> Option<bool> {
        match value {
            HstoreValue::Boolean(b) => Some(b),
            HstoreValue::Integer(i) => Some(i == 1),
            HstoreValue::Float(f) => Some(f == 1.0),
            HstoreValue::String(s) => {
                let token = s.trim();
                if token.is_empty() {
                    return None;
                }
                let token = token.to_ascii_lowercase();
                Some(TRUE_TOKENS.contains(&token.as_str()))
            }
            // Present but not a recognized truth value
            _ => Some(false),
        }
    }

    fn time_cast(&self, value: HstoreValue) -> Option<DateTime<Utc>> {
        let time = match value {
            HstoreValue::Time(t) => Some(t),
            HstoreValue::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .and_then(|midnight| self.options.default_timezone.resolve(&midnight)),
            HstoreValue::Integer(secs) => Utc.timestamp_opt(secs, 0).single(),
            HstoreValue::Float(secs) => {
                float_to_integer(secs).and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            }
            HstoreValue::String(s) => {
                parse_time(&s, self.options.date_order, self.options.default_timezone)
            }
            HstoreValue::Boolean(_) | HstoreValue::Array(_) | HstoreValue::Hash(_) => None,
        }?;

        // Stored with second resolution
        time.with_nanosecond(0)
    }

    fn date_cast(&self, value: HstoreValue) -> Option<chrono::NaiveDate> {
        match value {
            HstoreValue::Date(d) => Some(d),
            HstoreValue::Time(t) => Some(self.options.default_timezone.date_of(&t)),
            HstoreValue::String(s) => parse_date(&s, self.options.date_order),
            _ => None,
        }
    }
}

impl TypeCast for StandardTypeCast {
    fn cast(&self, data_type: DataType, value: HstoreValue) -> Option<HstoreValue> {
        match data_type {
            DataType::String | DataType::Hash | DataType::Array => Some(value),
            DataType::Integer => self.integer_cast(value).map(HstoreValue::Integer),
            DataType::Float => self.float_cast(value).map(HstoreValue::Float),
            DataType::Boolean => self.boolean_cast(value).map(HstoreValue::Boolean),
            DataType::Time => self.time_cast(value).map(HstoreValue::Time),
            DataType::Date => self.date_cast(value).map(HstoreValue::Date),
        }
    }
}

fn float_to_integer(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

/// Coerce with the standard rules and default options
pub fn type_cast(data_type: DataType, value: Option<HstoreValue>) -> Option<HstoreValue> {
    value.and_then(|value| StandardTypeCast::default().cast(data_type, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cast(data_type: DataType, value: impl Into<HstoreValue>) -> Option<HstoreValue> {
        type_cast(data_type, Some(value.into()))
    }

    #[test]
    fn test_none_stays_none() {
        for data_type in crate::types::VALID_TYPES {
            assert_eq!(type_cast(data_type, None), None);
        }
    }

    #[test]
    fn test_passthrough_types() {
        assert_eq!(cast(DataType::String, "abc"), Some(HstoreValue::from("abc")));
        assert_eq!(
            cast(DataType::Array, vec!["a", "b"]),
            Some(HstoreValue::from(vec!["a", "b"]))
        );
        assert_eq!(cast(DataType::Hash, 5), Some(HstoreValue::Integer(5)));
    }

    #[test]
    fn test_integer_cast() {
        assert_eq!(cast(DataType::Integer, "42"), Some(HstoreValue::Integer(42)));
        assert_eq!(cast(DataType::Integer, "12abc"), Some(HstoreValue::Integer(12)));
        assert_eq!(cast(DataType::Integer, "abc"), Some(HstoreValue::Integer(0)));
        assert_eq!(cast(DataType::Integer, "   "), None);
        assert_eq!(cast(DataType::Integer, 3.99), Some(HstoreValue::Integer(3)));
        assert_eq!(cast(DataType::Integer, true), Some(HstoreValue::Integer(1)));
        assert_eq!(cast(DataType::Integer, f64::NAN), None);
    }

    #[test]
    fn test_float_cast() {
        assert_eq!(cast(DataType::Float, "3.5"), Some(HstoreValue::Float(3.5)));
        assert_eq!(cast(DataType::Float, "2.5 units"), Some(HstoreValue::Float(2.5)));
        assert_eq!(cast(DataType::Float, "n/a"), Some(HstoreValue::Float(0.0)));
        assert_eq!(cast(DataType::Float, 7), Some(HstoreValue::Float(7.0)));
    }

    #[test]
    fn test_boolean_cast() {
        for truthy in ["true", "TRUE", "t", "1", "on", "yes"] {
            assert_eq!(cast(DataType::Boolean, truthy), Some(HstoreValue::Boolean(true)));
        }
        for falsy in ["false", "f", "0", "off", "no", "maybe"] {
            assert_eq!(cast(DataType::Boolean, falsy), Some(HstoreValue::Boolean(false)));
        }
        assert_eq!(cast(DataType::Boolean, ""), None);
        assert_eq!(cast(DataType::Boolean, 1), Some(HstoreValue::Boolean(true)));
        assert_eq!(cast(DataType::Boolean, 0), Some(HstoreValue::Boolean(false)));
        assert_eq!(cast(DataType::Boolean, false), Some(HstoreValue::Boolean(false)));
    }

    #[test]
    fn test_time_cast_adjusts_offset_and_truncates() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        assert_eq!(
            cast(DataType::Time, "2024-01-15T10:00:00.750+02:00"),
            Some(HstoreValue::Time(expected))
        );
        assert_eq!(
            cast(DataType::Time, expected.timestamp()),
            Some(HstoreValue::Time(expected))
        );
        assert_eq!(cast(DataType::Time, "0000-00-00 00:00:00"), None);
        assert_eq!(cast(DataType::Time, "garbage"), None);
    }

    #[test]
    fn test_date_cast() {
        let expected = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        assert_eq!(cast(DataType::Date, "2023-12-25"), Some(HstoreValue::Date(expected)));
        assert_eq!(cast(DataType::Date, "25 Dec 2023"), Some(HstoreValue::Date(expected)));
        let noon = Utc.with_ymd_and_hms(2023, 12, 25, 12, 0, 0).unwrap();
        assert_eq!(cast(DataType::Date, noon), Some(HstoreValue::Date(expected)));
        assert_eq!(cast(DataType::Date, "nope"), None);
    }

    #[test]
    fn test_date_cast_of_timestamp_text_keeps_written_day() {
        assert_eq!(
            cast(DataType::Date, "2024-01-15T23:30:00-05:00"),
            Some(HstoreValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
        );

        // A real point in time is still read in the default timezone
        let late = Utc.with_ymd_and_hms(2024, 1, 16, 4, 30, 0).unwrap();
        assert_eq!(
            cast(DataType::Date, late),
            Some(HstoreValue::Date(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()))
        );
    }

    #[test]
    fn test_date_order_option() {
        let caster = StandardTypeCast::new(CastOptions::new(
            DefaultTimezone::Utc,
            DateOrder::MonthDayYear,
        ));
        assert_eq!(
            caster.cast(DataType::Date, HstoreValue::from("12/25/2023")),
            Some(HstoreValue::Date(NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()))
        );
    }
}
