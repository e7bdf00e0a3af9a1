//! Traits for hstore-backed records
//!
//! This module contains the traits that connect field tables to host records
//! and to the database.

pub mod finder;
pub mod record;

// Re-export all public items for convenience
pub use finder::HstoreFinder;
pub use record::{HstoreMap, HstoreRecord};
