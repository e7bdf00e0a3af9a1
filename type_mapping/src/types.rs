//! Type mapping definitions
//!
//! This module provides the declared data types of hstore-backed fields
//! and the typed runtime values stored under them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::validate::InvalidDataTypeError;

/// Declared type of a field stored inside an hstore column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Float,
    Time,
    Boolean,
    Array,
    Hash,
    Date,
}

/// The fixed set of types a field may be declared with
pub const VALID_TYPES: [DataType; 8] = [
    DataType::String,
    DataType::Integer,
    DataType::Float,
    DataType::Time,
    DataType::Boolean,
    DataType::Array,
    DataType::Hash,
    DataType::Date,
];

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Time => "time",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
            DataType::Hash => "hash",
            DataType::Date => "date",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = InvalidDataTypeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        // Accept symbol-style names (":integer") as well as bare ones
        let normalized = name.trim().trim_start_matches(':');
        VALID_TYPES
            .iter()
            .copied()
            .find(|data_type| data_type.as_str() == normalized)
            .ok_or_else(|| InvalidDataTypeError(name.to_string()))
    }
}

/// Typed value of an hstore-backed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HstoreValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Time(DateTime<Utc>),
    Date(NaiveDate),
    Array(Vec<String>),
    Hash(Map<String, Value>),
}

impl HstoreValue {
    /// The data type whose canonical in-memory form this value has
    pub fn data_type(&self) -> DataType {
        match self {
            HstoreValue::String(_) => DataType::String,
            HstoreValue::Integer(_) => DataType::Integer,
            HstoreValue::Float(_) => DataType::Float,
            HstoreValue::Boolean(_) => DataType::Boolean,
            HstoreValue::Time(_) => DataType::Time,
            HstoreValue::Date(_) => DataType::Date,
            HstoreValue::Array(_) => DataType::Array,
            HstoreValue::Hash(_) => DataType::Hash,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HstoreValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            HstoreValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            HstoreValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HstoreValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            HstoreValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            HstoreValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            HstoreValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&Map<String, Value>> {
        match self {
            HstoreValue::Hash(map) => Some(map),
            _ => None,
        }
    }
}

/// Default stringification, used where a type has no dedicated serializer
impl fmt::Display for HstoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HstoreValue::String(s) => f.write_str(s),
            HstoreValue::Integer(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" on integral floats
            HstoreValue::Float(x) => write!(f, "{:?}", x),
            HstoreValue::Boolean(b) => write!(f, "{}", b),
            HstoreValue::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S UTC")),
            HstoreValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            HstoreValue::Array(items) => {
                let json = serde_json::to_string(items).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            HstoreValue::Hash(map) => {
                let json = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// Convert basic Rust types to HstoreValue
impl From<String> for HstoreValue {
    fn from(val: String) -> Self {
        HstoreValue::String(val)
    }
}

impl From<&str> for HstoreValue {
    fn from(val: &str) -> Self {
        HstoreValue::String(val.to_string())
    }
}

impl From<i64> for HstoreValue {
    fn from(val: i64) -> Self {
        HstoreValue::Integer(val)
    }
}

impl From<i32> for HstoreValue {
    fn from(val: i32) -> Self {
        HstoreValue::Integer(val as i64)
    }
}

impl From<f64> for HstoreValue {
    fn from(val: f64) -> Self {
        HstoreValue::Float(val)
    }
}

impl From<bool> for HstoreValue {
    fn from(val: bool) -> Self {
        HstoreValue::Boolean(val)
    }
}

impl From<DateTime<Utc>> for HstoreValue {
    fn from(val: DateTime<Utc>) -> Self {
        HstoreValue::Time(val)
    }
}

impl From<NaiveDate> for HstoreValue {
    fn from(val: NaiveDate) -> Self {
        HstoreValue::Date(val)
    }
}

impl From<Vec<String>> for HstoreValue {
    fn from(val: Vec<String>) -> Self {
        HstoreValue::Array(val)
    }
}

impl From<Vec<&str>> for HstoreValue {
    fn from(val: Vec<&str>) -> Self {
        HstoreValue::Array(val.into_iter().map(str::to_string).collect())
    }
}

impl From<Map<String, Value>> for HstoreValue {
    fn from(val: Map<String, Value>) -> Self {
        HstoreValue::Hash(val)
    }
}

/// Error returned when a typed value is read as the wrong Rust type
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTypeMismatch {
    pub expected: DataType,
    pub actual: DataType,
}

impl fmt::Display for ValueTypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a {} value, found {}", self.expected, self.actual)
    }
}

impl std::error::Error for ValueTypeMismatch {}

macro_rules! impl_try_from_value {
    ($target:ty, $variant:ident, $data_type:expr) => {
        impl TryFrom<HstoreValue> for $target {
            type Error = ValueTypeMismatch;

            fn try_from(value: HstoreValue) -> Result<Self, Self::Error> {
                match value {
                    HstoreValue::$variant(inner) => Ok(inner),
                    other => Err(ValueTypeMismatch {
                        expected: $data_type,
                        actual: other.data_type(),
                    }),
                }
            }
        }
    };
}

impl_try_from_value!(String, String, DataType::String);
impl_try_from_value!(i64, Integer, DataType::Integer);
impl_try_from_value!(f64, Float, DataType::Float);
impl_try_from_value!(bool, Boolean, DataType::Boolean);
impl_try_from_value!(DateTime<Utc>, Time, DataType::Time);
impl_try_from_value!(NaiveDate, Date, DataType::Date);
impl_try_from_value!(Vec<String>, Array, DataType::Array);
impl_try_from_value!(Map<String, Value>, Hash, DataType::Hash);
