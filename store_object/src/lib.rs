//! Store Object - typed field access for PostgreSQL hstore columns
//!
//! This crate provides field tables, generic accessors over host records,
//! predicate translation for hstore queries, and an async store that runs
//! those queries.

pub mod accessors;
pub mod errors;
pub mod field;
pub mod generic_store;
pub mod prelude;
pub mod query_builder;
pub mod tracked;
pub mod traits;
pub mod validation;

pub use errors::HstoreError;
pub use field::{hstore_accessor, FieldDeclaration, FieldSpec, FieldTable};
pub use generic_store::{HstoreId, HstoreStore};
pub use query_builder::{
    FieldPredicates, HstorePredicate, PredicateKind, QueryBuilder, QueryFilter, QueryOperator,
    SortOrder,
};
pub use tracked::HstoreAttributes;
pub use traits::*;
pub use validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

use sqlx::PgPool;

pub type DbPool = PgPool;
