//! Convenience re-exports for common hstore-accessor usage
//!
//! # Example
//!
//! ```rust
//! use hstore_accessor::prelude::*;
//!
//! let fields = hstore_accessor("options", [("color", "string")]).unwrap();
//! assert!(fields.contains("color"));
//! ```

// Registry
pub use crate::core::HstoreAccessor;
pub use crate::errors::HstoreAccessorError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, HstoreConfig};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Coercion
pub use type_mapping::{CastOptions, DateOrder, DefaultTimezone, StandardTypeCast, TypeCast};

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;
