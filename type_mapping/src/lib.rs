//! Typed value mapping for hstore-backed fields
//! This crate converts between typed field values and the canonical strings
//! stored in a PostgreSQL hstore column, and coerces raw input into field types.

pub mod cast;
pub mod parse;
pub mod serialize;
pub mod sql;
pub mod types;
pub mod validate;

pub use cast::{type_cast, CastOptions, StandardTypeCast, TypeCast};
pub use parse::{DateOrder, DefaultTimezone};
pub use serialize::{decode_array, deserialize, encode_array, serialize, Deserializer, Serializer, SEPARATOR};
pub use sql::{data_type_to_pg_cast, hstore_extract, hstore_extract_cast, quote_literal};
pub use types::{DataType, HstoreValue, ValueTypeMismatch, VALID_TYPES};
pub use validate::{is_valid_type, InvalidDataTypeError};
