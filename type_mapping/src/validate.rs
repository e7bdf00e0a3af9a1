//! Validation utilities for type mapping
//!
//! This module provides validation functions
//! for declared field types.

use crate::types::DataType;
use std::fmt;

/// Raised at declaration time when a field names a type outside `VALID_TYPES`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDataTypeError(pub String);

impl fmt::Display for InvalidDataTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hstore data type: {}", self.0)
    }
}

impl std::error::Error for InvalidDataTypeError {}

/// Check if a type name is one of the declarable hstore types
pub fn is_valid_type(name: &str) -> bool {
    name.parse::<DataType>().is_ok()
}
