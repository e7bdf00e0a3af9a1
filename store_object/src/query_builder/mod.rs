//! Query builder utilities
//!
//! Hstore field predicates and the clauses that combine them.

pub mod builder;
pub mod filter;
pub mod ordering;
pub mod predicate;
pub mod sql_generation;



pub use builder::QueryBuilder;
pub use filter::{LogicalOperator, QueryFilter, QueryOperator};
pub use ordering::SortOrder;
pub use predicate::{FieldPredicates, HstorePredicate, PredicateKind};
