//! Core registry
//!
//! `HstoreAccessor` holds the field tables declared per model and hstore
//! attribute, the coercion settings they share, and optionally the database
//! pool used to build stores for them.

use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use store_object::{FieldSpec, FieldTable, HstoreId, HstoreStore};
use type_mapping::{CastOptions, DateOrder, DefaultTimezone, StandardTypeCast};

use crate::errors::HstoreAccessorError;
use config::{ConfigError, DatabaseConfig, HstoreConfig};

/// Registry of hstore field tables keyed by model and attribute
pub struct HstoreAccessor {
    pool: Option<PgPool>,
    cast_options: CastOptions,
    models: HashMap<String, HashMap<String, Arc<FieldTable>>>,
}

impl std::fmt::Debug for HstoreAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HstoreAccessor")
            .field("connected", &self.pool.is_some())
            .field("cast_options", &self.cast_options)
            .field("models", &self.list_models())
            .finish()
    }
}

impl Default for HstoreAccessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Coercion settings described by the `[hstore]` configuration section
pub fn cast_options_from_config(config: &HstoreConfig) -> Result<CastOptions, HstoreAccessorError> {
    let default_timezone = config
        .default_timezone
        .parse::<DefaultTimezone>()
        .map_err(ConfigError::Invalid)?;
    let date_order = config
        .date_order
        .parse::<DateOrder>()
        .map_err(ConfigError::Invalid)?;
    Ok(CastOptions::new(default_timezone, date_order))
}

impl HstoreAccessor {
    /// Create a registry with UTC times and day-month-year dates
    pub fn new() -> Self {
        Self {
            pool: None,
            cast_options: CastOptions::default(),
            models: HashMap::new(),
        }
    }

    /// Create a registry with coercion settings from configuration
    pub fn with_config(config: &HstoreConfig) -> Result<Self, HstoreAccessorError> {
        config.validate()?;
        let mut accessor = Self::new();
        accessor.cast_options = cast_options_from_config(config)?;
        Ok(accessor)
    }

    /// Use an existing pool for stores
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Open a pool from database configuration
    pub async fn connect(&mut self, config: &DatabaseConfig) -> Result<(), HstoreAccessorError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&connection_string).await?;
        crate::debug_log!(host = %config.host, database = %config.database, "connected");

        self.pool = Some(pool);
        Ok(())
    }

    /// Get database pool reference
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn cast_options(&self) -> CastOptions {
        self.cast_options
    }

    /// Declare typed fields on a model's hstore attribute and register them
    ///
    /// Nothing is registered when any field spec is invalid.
    pub fn hstore_accessor<I, K, S>(
        &mut self,
        model: &str,
        attribute: &str,
        fields: I,
    ) -> Result<Arc<FieldTable>, HstoreAccessorError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<FieldSpec>,
    {
        let table = FieldTable::declare(attribute, fields)?
            .with_type_cast(Arc::new(StandardTypeCast::new(self.cast_options)));
        self.register(model, table)
    }

    /// Register an already declared field table for a model
    pub fn register(&mut self, model: &str, table: FieldTable) -> Result<Arc<FieldTable>, HstoreAccessorError> {
        let attributes = self.models.entry(model.to_string()).or_default();
        if attributes.contains_key(table.attribute()) {
            return Err(HstoreAccessorError::AttributeAlreadyRegistered {
                model: model.to_string(),
                attribute: table.attribute().to_string(),
            });
        }

        crate::debug_log!(
            model,
            attribute = table.attribute(),
            fields = table.metadata().len(),
            "registered hstore attribute"
        );

        let table = Arc::new(table);
        attributes.insert(table.attribute().to_string(), Arc::clone(&table));
        Ok(table)
    }

    /// Field table of a model's hstore attribute
    pub fn fields_for(&self, model: &str, attribute: &str) -> Result<Arc<FieldTable>, HstoreAccessorError> {
        crate::trace_log!(model, attribute, "looking up hstore fields");
        self.models
            .get(model)
            .and_then(|attributes| attributes.get(attribute))
            .cloned()
            .ok_or_else(|| HstoreAccessorError::ModelNotFound {
                model: model.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Hstore attributes registered for a model, sorted
    pub fn attributes_for(&self, model: &str) -> Vec<&str> {
        let mut attributes: Vec<&str> = self
            .models
            .get(model)
            .map(|attributes| attributes.keys().map(String::as_str).collect())
            .unwrap_or_default();
        attributes.sort_unstable();
        attributes
    }

    /// List all models with registered attributes, sorted
    pub fn list_models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = self.models.keys().map(String::as_str).collect();
        models.sort_unstable();
        models
    }

    /// Build a store for a registered attribute on `table`
    pub fn store<Id: HstoreId>(
        &self,
        model: &str,
        attribute: &str,
        table: &str,
        id_column: &str,
    ) -> Result<HstoreStore<Id>, HstoreAccessorError> {
        let pool = self.pool.clone().ok_or(HstoreAccessorError::NotConnected)?;
        let fields = self.fields_for(model, attribute)?;
        Ok(HstoreStore::new(pool, table, id_column, fields)?)
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), HstoreAccessorError> {
        let pool = self.pool.as_ref().ok_or(HstoreAccessorError::NotConnected)?;
        sqlx::query("SELECT 1").fetch_one(pool).await?;
        Ok(())
    }
}
