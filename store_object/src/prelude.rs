//! Convenience re-exports for common store-object usage

// Declarations and accessors
pub use crate::field::{hstore_accessor, FieldDeclaration, FieldSpec, FieldTable};
pub use crate::tracked::HstoreAttributes;

// Core traits
pub use crate::traits::{HstoreFinder, HstoreMap, HstoreRecord};

// Error types
pub use crate::errors::HstoreError;

// Core store functionality
pub use crate::generic_store::HstoreStore;

// Query building
pub use crate::query_builder::{HstorePredicate, QueryBuilder, QueryFilter, SortOrder};

// Value types
pub use type_mapping::{DataType, HstoreValue};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use sqlx::PgPool;
