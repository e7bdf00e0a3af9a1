//! Generic store implementations
//!
//! Runs query builders against the table and reads or replaces whole hstore
//! mappings.

use super::core::{HstoreId, HstoreStore};
use crate::errors::HstoreError;
use crate::query_builder::QueryBuilder;
use crate::tracked::HstoreAttributes;
use crate::traits::finder::HstoreFinder;
use crate::traits::record::{HstoreMap, HstoreRecord};
use async_trait::async_trait;
use sqlx::postgres::types::PgHstore;
use sqlx::postgres::PgRow;
use sqlx::Row;

// Values are bound with their JSON type; strings always stay text
macro_rules! bind_json_param {
    ($query:expr, $param:expr) => {
        match $param {
            serde_json::Value::String(s) => $query.bind(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    $query.bind(i)
                } else if let Some(f) = n.as_f64() {
                    $query.bind(f)
                } else {
                    $query.bind(n.to_string())
                }
            }
            serde_json::Value::Bool(b) => $query.bind(b),
            serde_json::Value::Null => $query.bind(Option::<String>::None),
            other => $query.bind(other.to_string()),
        }
    };
}

fn append_clause(sql: &mut String, clause: &str) {
    if !clause.is_empty() {
        sql.push(' ');
        sql.push_str(clause);
    }
}

impl<I: HstoreId> HstoreStore<I> {
    fn read_row(&self, row: &PgRow) -> Result<(I, HstoreMap), HstoreError> {
        let id: I = row
            .try_get(0)
            .map_err(|e| HstoreError::database_operation(self.table_name(), "decode id", e))?;
        let mapping: Option<PgHstore> = row
            .try_get(1)
            .map_err(|e| HstoreError::database_operation(self.table_name(), "decode hstore", e))?;
        Ok((id, mapping.map(|hstore| hstore.0).unwrap_or_default()))
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT {}, {} FROM {}",
            self.id_column,
            self.column(),
            self.table
        )
    }

    /// Load one row into dirty-tracking attributes
    pub async fn load_record(&self, id: &I) -> Result<Option<HstoreAttributes>, HstoreError> {
        let mut sql = self.select_sql();
        sql.push_str(&format!(" WHERE {} = $1", self.id_column));

        let row = sqlx::query(&sql)
            .bind(id.clone())
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| HstoreError::database_operation(self.table_name(), "load_record", e))?;

        match row {
            Some(row) => {
                let (_, mapping) = self.read_row(&row)?;
                Ok(Some(HstoreAttributes::with_persisted(self.column(), mapping)))
            }
            None => Ok(None),
        }
    }

    /// Persist the column when it has unsaved changes, then accept them
    ///
    /// Returns whether an update was written.
    pub async fn save_changes(&self, id: &I, record: &mut HstoreAttributes) -> Result<bool, HstoreError> {
        let column = self.column();
        if !record.is_changed(column) {
            return Ok(false);
        }

        let mapping = record.hstore(column).cloned().unwrap_or_default();
        let written = self.write_mapping(id, &mapping).await?;
        if written {
            record.changes_applied();
        }
        Ok(written)
    }
}

#[async_trait]
impl<I: HstoreId> HstoreFinder for HstoreStore<I> {
    type Id = I;

    async fn find(&self, query: QueryBuilder) -> Result<Vec<(I, HstoreMap)>, HstoreError> {
        let (where_clause, order_clause, limit_clause, params) = query.build();
        let mut full_sql = self.select_sql();
        append_clause(&mut full_sql, &where_clause);
        append_clause(&mut full_sql, &order_clause);
        append_clause(&mut full_sql, &limit_clause);

        #[cfg(feature = "debug-logging")]
        tracing::debug!(
            table = self.table_name(),
            sql = %full_sql,
            params = params.len(),
            "executing hstore query"
        );

        let mut sqlx_query = sqlx::query(&full_sql);
        for param in params {
            sqlx_query = bind_json_param!(sqlx_query, param);
        }

        let rows = sqlx_query
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| HstoreError::database_operation(self.table_name(), "find", e))?;

        rows.iter().map(|row| self.read_row(row)).collect()
    }

    async fn find_one(&self, query: QueryBuilder) -> Result<Option<(I, HstoreMap)>, HstoreError> {
        let mut results = self.find(query.limit(1)).await?;
        Ok(results.pop())
    }

    async fn count_where(&self, query: QueryBuilder) -> Result<i64, HstoreError> {
        // No ORDER BY or LIMIT for COUNT
        let (where_clause, _, _, params) = query.build();
        let mut full_sql = format!("SELECT COUNT(*) AS total FROM {}", self.table);
        append_clause(&mut full_sql, &where_clause);

        let mut sqlx_query = sqlx::query(&full_sql);
        for param in params {
            sqlx_query = bind_json_param!(sqlx_query, param);
        }

        let result = sqlx_query
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| HstoreError::database_operation(self.table_name(), "count_where", e))?;

        result
            .try_get::<i64, _>("total")
            .map_err(|e| HstoreError::database_operation(self.table_name(), "count_where", e))
    }

    async fn write_mapping(&self, id: &I, mapping: &HstoreMap) -> Result<bool, HstoreError> {
        let sql = format!(
            "UPDATE {} SET {} = $1 WHERE {} = $2",
            self.table,
            self.column(),
            self.id_column
        );

        #[cfg(feature = "debug-logging")]
        tracing::debug!(
            table = self.table_name(),
            keys = mapping.len(),
            "writing hstore mapping"
        );

        let result = sqlx::query(&sql)
            .bind(PgHstore(mapping.clone()))
            .bind(id.clone())
            .execute(&self.db_pool)
            .await
            .map_err(|e| HstoreError::database_operation(self.table_name(), "write_mapping", e))?;

        Ok(result.rows_affected() > 0)
    }
}
