//! Driver port for connecting to a document store and running operations.

use crate::store::domain::{CollectionName, FieldKey, InsertAck, InsertPayload, StoreConfig};
use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::{Bson, Document};
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Cursor over query results, yielding documents in driver-native order.
pub type DocumentCursor = BoxStream<'static, DriverResult<Document>>;

/// Entry point of a document-store client.
#[cfg_attr(test, mockall::automock(type Connection = MockDriverConnection;))]
#[async_trait]
pub trait DocumentDriver: Send + Sync + 'static {
    /// Open connection handle produced by [`DocumentDriver::connect`].
    type Connection: DriverConnection;

    /// Opens a connection described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Connect`] for malformed URLs, unreachable
    /// servers, and authentication failures.
    async fn connect(&self, config: &StoreConfig) -> DriverResult<Self::Connection>;
}

/// An open database session.
#[cfg_attr(test, mockall::automock(type Collection = MockDriverCollection;))]
#[async_trait]
pub trait DriverConnection: Send + Sync + 'static {
    /// Collection handle bound to this connection.
    type Collection: DriverCollection;

    /// Binds a collection by name. No I/O happens here.
    fn collection(&self, name: &CollectionName) -> Self::Collection;

    /// Releases the connection. Closing never fails from the caller's view.
    async fn close(&self);
}

/// Operations against one collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DriverCollection: Send + Sync + 'static {
    /// Issues a query and returns a cursor over matching documents.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Operation`] when the query is rejected.
    async fn find(&self, filter: Document) -> DriverResult<DocumentCursor>;

    /// Returns the distinct values stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Operation`] when the lookup fails.
    async fn distinct(&self, key: &FieldKey) -> DriverResult<Vec<Bson>>;

    /// Inserts one document or an ordered batch.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Operation`] when the write is rejected.
    async fn insert(&self, payload: InsertPayload) -> DriverResult<InsertAck>;
}

/// Errors reported by driver adapters.
///
/// The driver's own error is kept as-is behind the variant so callers can
/// downcast to it.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// Connecting or authenticating failed.
    #[error("connect failed: {0}")]
    Connect(Arc<dyn StdError + Send + Sync>),

    /// A query, insert, or distinct call failed.
    #[error("operation failed: {0}")]
    Operation(Arc<dyn StdError + Send + Sync>),
}

impl DriverError {
    /// Wraps a connection failure.
    pub fn connect(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Connect(Arc::new(err))
    }

    /// Wraps an operation failure.
    pub fn operation(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Operation(Arc::new(err))
    }

    /// Returns `true` when the failure happened while connecting.
    #[must_use]
    pub const fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }

    /// Returns the driver's original error.
    #[must_use]
    pub fn driver_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match self {
            Self::Connect(err) | Self::Operation(err) => err.as_ref(),
        }
    }

    /// Downcasts the driver's original error to a concrete type.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.driver_error().downcast_ref::<E>()
    }
}
