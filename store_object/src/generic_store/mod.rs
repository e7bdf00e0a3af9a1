pub mod core;
pub mod hstore_store;

pub use core::{HstoreId, HstoreStore};
