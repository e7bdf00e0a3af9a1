//! Query builder
//!
//! Collects filters, ordering and paging, and renders them as SQL clauses.

use serde_json::Value;

use crate::errors::HstoreError;
use crate::field::FieldTable;
use crate::query_builder::filter::QueryFilter;
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::predicate::HstorePredicate;
use crate::query_builder::sql_generation::SqlGenerator;
use crate::traits::record::HstoreMap;

/// Query builder for selecting records by their hstore fields
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add an hstore predicate (combined with AND)
    pub fn where_hstore(self, predicate: HstorePredicate) -> Self {
        self.filter(QueryFilter::Hstore(predicate))
    }

    /// Add ordering on a plain column
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Order by an hstore field, compared by its declared type
    pub fn order_by_field(mut self, fields: &FieldTable, field: &str, order: SortOrder) -> Result<Self, HstoreError> {
        let expression = fields.sort_expression(field)?;
        self.order_by.push((expression, order));
        Ok(self)
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Whether a loaded mapping satisfies every hstore predicate
    pub fn matches(&self, mapping: &HstoreMap) -> bool {
        self.conditions.iter().all(|filter| filter.matches(mapping))
    }

    /// Build WHERE clause
    pub fn build_where_clause(&self) -> (String, Vec<Value>) {
        SqlGenerator::build_where_clause(&self.conditions)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(&self) -> String {
        SqlGenerator::build_order_clause(&self.order_by)
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(&self) -> String {
        SqlGenerator::build_limit_clause(self.limit, self.offset)
    }

    /// Build complete query parts (WHERE, ORDER BY, LIMIT, Values)
    pub fn build(&self) -> (String, String, String, Vec<Value>) {
        let (where_clause, values) = self.build_where_clause();
        let order_clause = self.build_order_clause();
        let limit_clause = self.build_limit_clause();

        (where_clause, order_clause, limit_clause, values)
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
