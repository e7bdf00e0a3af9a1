//! # hstore-accessor
//!
//! Typed fields stored inside a PostgreSQL hstore column: declaration,
//! canonical string encoding, lenient type coercion, and query predicates
//! that compare stored values by their declared type.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hstore_accessor::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut accessor = HstoreAccessor::new();
//!     let fields = accessor.hstore_accessor(
//!         "Product",
//!         "options",
//!         [
//!             ("color", FieldSpec::new("string")),
//!             ("price", FieldSpec::new("integer").store_key("price_in_cents")),
//!             ("tags", FieldSpec::new("array")),
//!         ],
//!     )?;
//!
//!     let mut record = HstoreAttributes::new();
//!     fields.set(&mut record, "price", "1299")?;
//!     fields.set(&mut record, "tags", vec!["new", "sale"])?;
//!     assert_eq!(fields.read::<i64, _>(&record, "price")?, Some(1299));
//!
//!     let query = QueryBuilder::new()
//!         .where_hstore(fields.predicates("price")?.gt(1000)?)
//!         .where_hstore(fields.predicates("tags")?.contains("sale")?);
//!     let (where_clause, _, _, params) = query.build();
//!     println!("{} {:?}", where_clause, params);
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::{cast_options_from_config, HstoreAccessor};
pub use errors::HstoreAccessorError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, HstoreConfig};

// Re-export internal crates used by the public API
pub use store_object;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use sqlx;
pub use async_trait;
