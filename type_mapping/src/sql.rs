//! SQL type conversion utilities
//!
//! This module maps declared hstore types to the PostgreSQL types their
//! stored text is cast to before comparison.

use crate::types::DataType;

/// PostgreSQL type the extracted hstore text is cast to for predicates
///
/// `None` means the text is compared as-is.
pub fn data_type_to_pg_cast(data_type: DataType) -> Option<&'static str> {
    match data_type {
        DataType::Integer => Some("bigint"),
        DataType::Float => Some("double precision"),
        // Stored as epoch seconds
        DataType::Time => Some("bigint"),
        DataType::String
        | DataType::Boolean
        | DataType::Date
        | DataType::Array
        | DataType::Hash => None,
    }
}

/// Quote a string as a PostgreSQL text literal
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Build the expression extracting one store key from an hstore column
pub fn hstore_extract(column: &str, store_key: &str) -> String {
    format!("{} -> {}", column, quote_literal(store_key))
}

/// Build the extraction expression with the cast for the declared type applied
pub fn hstore_extract_cast(column: &str, store_key: &str, data_type: DataType) -> String {
    let extract = hstore_extract(column, store_key);
    match data_type_to_pg_cast(data_type) {
        Some(pg_type) => format!("({})::{}", extract, pg_type),
        None => extract,
    }
}
