//! Query filters
//!
//! Plain column conditions and hstore field predicates, combined into
//! nested AND/OR groups.

use serde_json::Value;

use crate::query_builder::predicate::HstorePredicate;
use crate::traits::record::HstoreMap;

/// Query condition operators
#[derive(Debug, Clone)]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
    HasKey,    // ? (hstore key present)
}

/// Single condition on a plain column
#[derive(Debug, Clone)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Option<Value>, // None for IS NULL/IS NOT NULL
}

/// Logical operators for combining conditions
#[derive(Debug, Clone)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Hstore(HstorePredicate),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, value: Option<Value>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            value,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    pub fn eq(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Eq, Some(value))
    }

    pub fn ne(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Ne, Some(value))
    }

    pub fn gt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gt, Some(value))
    }

    pub fn gte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gte, Some(value))
    }

    pub fn lt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lt, Some(value))
    }

    pub fn lte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lte, Some(value))
    }

    /// IN condition
    pub fn in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::In, Some(Value::Array(values)))
    }

    /// NOT IN condition
    pub fn not_in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::NotIn, Some(Value::Array(values)))
    }

    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, None)
    }

    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, None)
    }

    /// Rows whose hstore column has `key`, whatever its value
    pub fn has_key(column: &str, key: &str) -> Self {
        Self::condition(
            column,
            QueryOperator::HasKey,
            Some(Value::String(key.to_string())),
        )
    }

    /// Evaluate the hstore predicates of this filter against one mapping
    ///
    /// Plain column conditions cannot be checked against a mapping and are
    /// treated as satisfied.
    pub fn matches(&self, mapping: &HstoreMap) -> bool {
        match self {
            QueryFilter::Condition(condition) => match (&condition.operator, &condition.value) {
                (QueryOperator::HasKey, Some(Value::String(key))) => mapping.contains_key(key),
                _ => true,
            },
            QueryFilter::Hstore(predicate) => predicate.matches(mapping),
            QueryFilter::Group { operator, filters } => match operator {
                LogicalOperator::And => filters.iter().all(|f| f.matches(mapping)),
                LogicalOperator::Or => filters.iter().any(|f| f.matches(mapping)),
            },
        }
    }
}

impl From<HstorePredicate> for QueryFilter {
    fn from(predicate: HstorePredicate) -> Self {
        QueryFilter::Hstore(predicate)
    }
}
