use thiserror::Error;
use type_mapping::{DataType, InvalidDataTypeError, ValueTypeMismatch};

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum HstoreError {
    #[error("Invalid data type: {0}")]
    InvalidDataType(#[from] InvalidDataTypeError),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    #[error("Field '{field}' is declared more than once on '{attribute}'")]
    DuplicateField { attribute: String, field: String },

    #[error("Unknown field '{field}' on '{attribute}'")]
    UnknownField { attribute: String, field: String },

    #[error("Field '{field}' of type {data_type} has no '{predicate}' predicate")]
    UnsupportedPredicate {
        field: String,
        data_type: DataType,
        predicate: &'static str,
    },

    #[error("Unknown scope: {0}")]
    UnknownScope(String),

    #[error("Type mismatch on '{field}': {source}")]
    TypeMismatch {
        field: String,
        #[source]
        source: ValueTypeMismatch,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl HstoreError {
    pub fn unknown_field(attribute: &str, field: &str) -> Self {
        Self::UnknownField {
            attribute: attribute.to_string(),
            field: field.to_string(),
        }
    }

    pub fn database_operation(table: &str, operation: &str, error: sqlx::Error) -> Self {
        Self::DatabaseError(format!("{} on '{}' failed: {}", operation, table, error))
    }
}
