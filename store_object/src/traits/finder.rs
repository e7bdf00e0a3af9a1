//! Trait definitions
//!
//! This module defines the database operations over a table's hstore column.

use crate::errors::HstoreError;
use crate::query_builder::QueryBuilder;
use crate::traits::record::HstoreMap;
use async_trait::async_trait;
use std::fmt::Debug;

/// Queries and writes the hstore column of one table
#[async_trait]
pub trait HstoreFinder: Send + Sync + Debug {
    /// Type of the table's key column
    type Id: Clone + Send + Sync + Debug;

    /// Rows matching the query, as key and mapping
    async fn find(&self, query: QueryBuilder) -> Result<Vec<(Self::Id, HstoreMap)>, HstoreError>;

    /// First row matching the query
    async fn find_one(&self, query: QueryBuilder) -> Result<Option<(Self::Id, HstoreMap)>, HstoreError>;

    /// Number of rows matching the query's filters
    async fn count_where(&self, query: QueryBuilder) -> Result<i64, HstoreError>;

    /// Replace the stored mapping of one row, returning whether the row exists
    async fn write_mapping(&self, id: &Self::Id, mapping: &HstoreMap) -> Result<bool, HstoreError>;
}
