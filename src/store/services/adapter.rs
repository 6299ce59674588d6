//! Task adapter: driver calls exposed as deferred connect-operate-close
//! chains.

use super::{CollectionRef, StoreTask};
use crate::deferred::Task;
use crate::store::{
    domain::{
        ChainStage, CollectionName, ConnectionId, FieldKey, InsertAck, InsertPayload, StoreConfig,
    },
    ports::DocumentDriver,
};
use mongodb::bson::{Bson, Document};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Exposes a document-store driver as lazily executed tasks.
///
/// One adapter is created per configuration. It holds no connection state:
/// every task it returns opens its own connection when run and threads that
/// connection to its own close step. Tasks from one adapter may run
/// concurrently without touching each other's connections.
pub struct TaskAdapter<D: DocumentDriver> {
    driver: Arc<D>,
    config: Arc<StoreConfig>,
}

impl<D: DocumentDriver> TaskAdapter<D> {
    /// Creates an adapter over `driver` using `config`.
    #[must_use]
    pub fn new(driver: Arc<D>, config: StoreConfig) -> Self {
        Self {
            driver,
            config: Arc::new(config),
        }
    }

    /// Returns the adapter configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns a task that connects and binds `collection`.
    ///
    /// The caller owns the resulting connection and releases it with
    /// [`CollectionRef::close`]. Connect failures resolve the task with the
    /// driver's error; there is no retry.
    pub fn open(&self, collection: CollectionName) -> StoreTask<CollectionRef<D::Connection>> {
        let driver = Arc::clone(&self.driver);
        let config = Arc::clone(&self.config);
        Task::new(move || async move {
            let connection_id = ConnectionId::new();
            debug!(
                %connection_id,
                %collection,
                stage = %ChainStage::Connecting,
                "opening connection"
            );
            match driver.connect(&config).await {
                Ok(connection) => {
                    debug!(
                        %connection_id,
                        %collection,
                        stage = %ChainStage::Connected,
                        "connection opened"
                    );
                    Ok(CollectionRef::new(connection_id, collection, connection))
                }
                Err(error) => {
                    warn!(
                        %connection_id,
                        %collection,
                        stage = %ChainStage::Failed,
                        %error,
                        "connect failed"
                    );
                    Err(error)
                }
            }
        })
    }

    /// Captures a query filter; bind the collection with
    /// [`FindQuery::from`].
    pub fn find(&self, filter: Document) -> FindQuery<D> {
        FindQuery {
            adapter: self.clone(),
            filter,
        }
    }

    /// Captures a field key; bind the collection with
    /// [`DistinctQuery::from`].
    pub fn distinct(&self, key: FieldKey) -> DistinctQuery<D> {
        DistinctQuery {
            adapter: self.clone(),
            key,
        }
    }

    /// Captures a document or batch; bind the collection with
    /// [`InsertCommand::to`].
    pub fn insert(&self, payload: impl Into<InsertPayload>) -> InsertCommand<D> {
        InsertCommand {
            adapter: self.clone(),
            payload: payload.into(),
        }
    }

    /// Returns a view with every operation bound to `name`.
    pub fn collection(&self, name: CollectionName) -> BoundCollection<D> {
        BoundCollection {
            adapter: self.clone(),
            name,
        }
    }

    /// Opens `collection`, runs `operate`, and closes the connection on
    /// both the success and the failure path.
    fn scoped<T, F>(&self, collection: CollectionName, operate: F) -> StoreTask<T>
    where
        T: Send + 'static,
        F: FnOnce(CollectionRef<D::Connection>) -> StoreTask<T> + Send + 'static,
    {
        let done_name = collection.clone();
        let failed_name = collection.clone();
        StoreTask::<T>::bracket(self.open(collection), operate, |handle| handle.close(()))
            .map(move |value| {
                debug!(collection = %done_name, stage = %ChainStage::Done, "chain finished");
                value
            })
            .map_err(move |error| {
                warn!(
                    collection = %failed_name,
                    stage = %ChainStage::Failed,
                    %error,
                    "chain failed"
                );
                error
            })
    }
}

impl<D: DocumentDriver> Clone for TaskAdapter<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            config: Arc::clone(&self.config),
        }
    }
}

impl<D: DocumentDriver> fmt::Debug for TaskAdapter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A find with its filter captured, waiting for a collection.
#[must_use = "bind a collection with `from` to get a task"]
pub struct FindQuery<D: DocumentDriver> {
    adapter: TaskAdapter<D>,
    filter: Document,
}

impl<D: DocumentDriver> FindQuery<D> {
    /// Returns a task resolving with every document in `collection` that
    /// matches the filter, in driver order.
    pub fn from(self, collection: CollectionName) -> StoreTask<Vec<Document>> {
        let filter = self.filter;
        self.adapter.scoped(collection, move |handle| handle.find(filter))
    }
}

/// A distinct lookup with its key captured, waiting for a collection.
#[must_use = "bind a collection with `from` to get a task"]
pub struct DistinctQuery<D: DocumentDriver> {
    adapter: TaskAdapter<D>,
    key: FieldKey,
}

impl<D: DocumentDriver> DistinctQuery<D> {
    /// Returns a task resolving with the distinct values of the key in
    /// `collection`.
    pub fn from(self, collection: CollectionName) -> StoreTask<Vec<Bson>> {
        let key = self.key;
        self.adapter.scoped(collection, move |handle| handle.distinct(key))
    }
}

/// An insert with its payload captured, waiting for a collection.
#[must_use = "bind a collection with `to` to get a task"]
pub struct InsertCommand<D: DocumentDriver> {
    adapter: TaskAdapter<D>,
    payload: InsertPayload,
}

impl<D: DocumentDriver> InsertCommand<D> {
    /// Returns a task inserting the payload into `collection` and resolving
    /// with the driver's acknowledgement.
    pub fn to(self, collection: CollectionName) -> StoreTask<InsertAck> {
        let payload = self.payload;
        self.adapter.scoped(collection, move |handle| handle.insert(payload))
    }
}

/// Adapter operations pre-bound to a single collection.
#[must_use]
pub struct BoundCollection<D: DocumentDriver> {
    adapter: TaskAdapter<D>,
    name: CollectionName,
}

impl<D: DocumentDriver> BoundCollection<D> {
    /// Returns the bound collection name.
    #[must_use]
    pub const fn name(&self) -> &CollectionName {
        &self.name
    }

    /// See [`TaskAdapter::open`].
    pub fn open(&self) -> StoreTask<CollectionRef<D::Connection>> {
        self.adapter.open(self.name.clone())
    }

    /// See [`FindQuery::from`].
    pub fn find(&self, filter: Document) -> StoreTask<Vec<Document>> {
        self.adapter.find(filter).from(self.name.clone())
    }

    /// See [`DistinctQuery::from`].
    pub fn distinct(&self, key: FieldKey) -> StoreTask<Vec<Bson>> {
        self.adapter.distinct(key).from(self.name.clone())
    }

    /// See [`InsertCommand::to`].
    pub fn insert(&self, payload: impl Into<InsertPayload>) -> StoreTask<InsertAck> {
        self.adapter.insert(payload).to(self.name.clone())
    }
}
