//! Error types for store domain validation and configuration loading.

use thiserror::Error;

/// Errors returned while constructing domain store values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreDomainError {
    /// The collection name is empty or uses reserved characters.
    #[error("invalid collection name '{0}'")]
    InvalidCollectionName(String),

    /// The field key is empty or starts with an operator prefix.
    #[error("invalid field key '{0}'")]
    InvalidFieldKey(String),

    /// The database name is empty, too long, or uses reserved characters.
    #[error("invalid database name '{0}'")]
    InvalidDatabaseName(String),

    /// The connection URL is empty after trimming.
    #[error("connection URL must not be empty")]
    EmptyUrl,

    /// A batch insert was requested with no documents.
    #[error("insert batch must contain at least one document")]
    EmptyInsertBatch,
}

/// Errors returned while loading a [`super::StoreConfig`].
#[derive(Debug, Error)]
pub enum StoreConfigError {
    /// A required environment variable is not set.
    #[error("missing configuration variable {0}")]
    MissingVariable(&'static str),

    /// The configuration document is not valid JSON for the expected shape.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A configured value failed domain validation.
    #[error(transparent)]
    Domain(#[from] StoreDomainError),
}
