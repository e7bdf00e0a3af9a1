//! SQL generation
//!
//! Renders filters, ordering and paging into clause strings with `$n`
//! placeholders and the values to bind for them.

use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::ordering::SortOrder;
use serde_json::Value;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from conditions
    pub fn build_where_clause(conditions: &[QueryFilter]) -> (String, Vec<Value>) {
        if conditions.is_empty() {
            return ("".to_string(), Vec::new());
        }

        let mut values = Vec::new();
        let mut param_counter = 1;

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values, &mut param_counter))
            .collect::<Vec<_>>()
            .join(" AND ");

        if conditions_sql.is_empty() {
            ("".to_string(), values)
        } else {
            (format!("WHERE {}", conditions_sql), values)
        }
    }

    pub(crate) fn build_condition_sql(
        filter: &QueryFilter,
        values: &mut Vec<Value>,
        param_counter: &mut i32,
    ) -> String {
        match filter {
            QueryFilter::Condition(condition) => {
                Self::build_single_condition_sql(condition, values, param_counter)
            }
            QueryFilter::Hstore(predicate) => predicate.to_sql(values, param_counter),
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    // Empty AND is vacuously true, empty OR matches nothing
                    return match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    };
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, values, param_counter))
                    .collect::<Vec<_>>()
                    .join(operator_str);

                format!("({})", group_conditions)
            }
        }
    }

    fn next_param(value: &Value, values: &mut Vec<Value>, param_counter: &mut i32) -> String {
        values.push(value.clone());
        let param = format!("${}", param_counter);
        *param_counter += 1;
        param
    }

    fn build_single_condition_sql(
        condition: &QueryCondition,
        values: &mut Vec<Value>,
        param_counter: &mut i32,
    ) -> String {
        let field = &condition.field;

        let comparison = |symbol: &str, values: &mut Vec<Value>, param_counter: &mut i32| {
            match &condition.value {
                Some(value) => {
                    let param = Self::next_param(value, values, param_counter);
                    format!("{} {} {}", field, symbol, param)
                }
                None => "1=0".to_string(), // Invalid condition
            }
        };

        match &condition.operator {
            QueryOperator::Eq => match &condition.value {
                Some(_) => comparison("=", values, param_counter),
                None => format!("{} IS NULL", field),
            },
            QueryOperator::Ne => match &condition.value {
                Some(_) => comparison("!=", values, param_counter),
                None => format!("{} IS NOT NULL", field),
            },
            QueryOperator::Gt => comparison(">", values, param_counter),
            QueryOperator::Gte => comparison(">=", values, param_counter),
            QueryOperator::Lt => comparison("<", values, param_counter),
            QueryOperator::Lte => comparison("<=", values, param_counter),
            QueryOperator::HasKey => comparison("?", values, param_counter),
            QueryOperator::In | QueryOperator::NotIn => {
                let negated = matches!(condition.operator, QueryOperator::NotIn);
                match &condition.value {
                    Some(Value::Array(array_values)) if !array_values.is_empty() => {
                        let placeholders: Vec<String> = array_values
                            .iter()
                            .map(|value| Self::next_param(value, values, param_counter))
                            .collect();
                        let keyword = if negated { "NOT IN" } else { "IN" };
                        format!("{} {} ({})", field, keyword, placeholders.join(", "))
                    }
                    // Empty IN matches nothing, empty NOT IN matches everything
                    _ if negated => "1=1".to_string(),
                    _ => "1=0".to_string(),
                }
            }
            QueryOperator::IsNull => format!("{} IS NULL", field),
            QueryOperator::IsNotNull => format!("{} IS NOT NULL", field),
        }
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[(String, SortOrder)]) -> String {
        if order_by.is_empty() {
            return "".to_string();
        }

        let order_items: Vec<String> = order_by
            .iter()
            .map(|(field, order)| format!("{} {}", field, order.to_sql()))
            .collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset));
        }

        clauses.join(" ")
    }
}
