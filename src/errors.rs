//! Error types for the hstore-accessor crate
//!
//! This module contains the errors returned by the registry and its setup.

use config::ConfigError;
use store_object::HstoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HstoreAccessorError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No fields registered for '{model}.{attribute}'")]
    ModelNotFound { model: String, attribute: String },

    #[error("Hstore attribute already registered: {model}.{attribute}")]
    AttributeAlreadyRegistered { model: String, attribute: String },

    #[error("No database pool; call connect or with_pool first")]
    NotConnected,

    #[error(transparent)]
    Hstore(#[from] HstoreError),
}
