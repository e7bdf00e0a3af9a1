//! Serialization utilities
//!
//! This module converts typed values to the canonical strings stored in an
//! hstore column and back.

use chrono::{TimeZone, Utc};
use serde_json::{Number, Value};
use std::sync::Arc;

use crate::parse::{integer_prefix, parse_date, parse_float_text, DateOrder};
use crate::types::{DataType, HstoreValue};

/// Token joining array elements inside one stored string
pub const SEPARATOR: &str = "||;||";

/// Custom per-field serializer used in place of the type's default rule
pub type Serializer = Arc<dyn Fn(&HstoreValue) -> String + Send + Sync>;

/// Custom per-field deserializer used in place of the type's default rule
pub type Deserializer = Arc<dyn Fn(&str) -> Option<HstoreValue> + Send + Sync>;

/// Convert a typed value into its stored string
///
/// `None` is never written as a sentinel; it stays `None`.
pub fn serialize(
    data_type: DataType,
    value: Option<&HstoreValue>,
    serializer: Option<&Serializer>,
) -> Option<String> {
    let value = value?;
    match serializer {
        Some(custom) => Some(custom(value)),
        None => Some(default_serialize(data_type, value)),
    }
}

/// Convert a stored string back into a typed value
///
/// Parsing is lenient: integer and float text without a number reads as zero.
/// Integer digits too large for an `i64` have no faithful value and read as
/// `None`, the same as the integer cast.
pub fn deserialize(
    data_type: DataType,
    value: Option<&str>,
    deserializer: Option<&Deserializer>,
) -> Option<HstoreValue> {
    let value = value?;
    if let Some(custom) = deserializer {
        return custom(value);
    }

    match data_type {
        DataType::String => Some(HstoreValue::String(value.to_string())),
        DataType::Integer => integer_prefix(value).map(HstoreValue::Integer),
        DataType::Float => Some(HstoreValue::Float(parse_float_text(value))),
        DataType::Boolean => Some(HstoreValue::Boolean(value == "true")),
        DataType::Time => integer_prefix(value)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(HstoreValue::Time),
        DataType::Date => parse_date(value, DateOrder::default())
            .map(HstoreValue::Date),
        DataType::Array => Some(HstoreValue::Array(decode_array(value))),
        DataType::Hash => serde_json::from_str::<Value>(value)
            .ok()
            .and_then(from_json),
    }
}

fn default_serialize(data_type: DataType, value: &HstoreValue) -> String {
    match (data_type, value) {
        (DataType::Boolean, value) => (value.to_string() == "true").to_string(),
        (DataType::Time, HstoreValue::Time(t)) => t.timestamp().to_string(),
        (DataType::Time, HstoreValue::Date(d)) => d
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight).timestamp())
            .unwrap_or(0)
            .to_string(),
        (DataType::Time, other) => integer_prefix(&other.to_string()).unwrap_or(0).to_string(),
        (DataType::Array, HstoreValue::Array(items)) => encode_array(items),
        // A lone value is stored as a one-element array
        (DataType::Array, other) => encode_array(&[other.to_string()]),
        (DataType::Hash, value) => to_json(value).to_string(),
        (_, other) => other.to_string(),
    }
}

/// JSON form of a value stored in a hash field
fn to_json(value: &HstoreValue) -> Value {
    match value {
        HstoreValue::Hash(map) => Value::Object(map.clone()),
        HstoreValue::String(s) => Value::String(s.clone()),
        HstoreValue::Integer(i) => Value::from(*i),
        HstoreValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        HstoreValue::Boolean(b) => Value::Bool(*b),
        HstoreValue::Array(items) => Value::from(items.clone()),
        HstoreValue::Time(_) | HstoreValue::Date(_) => Value::String(value.to_string()),
    }
}

fn from_json(json: Value) -> Option<HstoreValue> {
    match json {
        Value::Object(map) => Some(HstoreValue::Hash(map)),
        Value::String(s) => Some(HstoreValue::String(s)),
        Value::Bool(b) => Some(HstoreValue::Boolean(b)),
        Value::Number(n) => n
            .as_i64()
            .map(HstoreValue::Integer)
            .or_else(|| n.as_f64().map(HstoreValue::Float)),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(HstoreValue::Array),
        Value::Null => None,
    }
}

/// Join array elements with the separator token
///
/// Backslashes and pipes inside an element are escaped with a backslash, so an
/// encoded element never contains `||` and the separator cannot occur inside it.
pub fn encode_array<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| escape_element(item.as_ref()))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Split a stored array string back into its elements
pub fn decode_array(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(SEPARATOR).map(unescape_element).collect()
}

fn escape_element(element: &str) -> String {
    let mut escaped = String::with_capacity(element.len());
    for c in element.chars() {
        if c == '\\' || c == '|' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn unescape_element(element: &str) -> String {
    let mut unescaped = String::with_capacity(element.len());
    let mut chars = element.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            // A trailing lone backslash is kept as written
            unescaped.push(chars.next().unwrap_or('\\'));
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}
