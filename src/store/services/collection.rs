//! Collection handles that own the connection their chain opened.

use crate::deferred::Task;
use crate::store::{
    domain::{ChainStage, CollectionName, ConnectionId, FieldKey, InsertAck, InsertPayload},
    ports::{DriverCollection, DriverConnection, DriverResult},
};
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document};
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use super::StoreTask;

/// An open connection bound to one collection.
///
/// Clones share the same connection. Operations return tasks; nothing runs
/// until the task does. [`CollectionRef::close`] releases exactly this
/// connection, once, however many clones call it.
pub struct CollectionRef<C: DriverConnection> {
    id: ConnectionId,
    name: CollectionName,
    connection: Arc<C>,
    collection: Arc<C::Collection>,
    released: Arc<AtomicBool>,
}

impl<C: DriverConnection> CollectionRef<C> {
    pub(super) fn new(id: ConnectionId, name: CollectionName, connection: C) -> Self {
        let collection = connection.collection(&name);
        Self {
            id,
            name,
            connection: Arc::new(connection),
            collection: Arc::new(collection),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the identifier of the underlying connection.
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the bound collection name.
    #[must_use]
    pub const fn name(&self) -> &CollectionName {
        &self.name
    }

    /// Returns `true` once [`CollectionRef::close`] has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Queries the collection and collects every match into memory.
    ///
    /// The cursor is drained eagerly, so very large result sets are held in
    /// full before the task resolves.
    pub fn find(&self, filter: Document) -> StoreTask<Vec<Document>> {
        let collection = Arc::clone(&self.collection);
        let (id, name) = (self.id, self.name.clone());
        Task::new(move || {
            traced(id, name, "find", async move {
                let cursor = collection.find(filter).await?;
                cursor.try_collect().await
            })
        })
    }

    /// Looks up the distinct values stored under `key`.
    pub fn distinct(&self, key: FieldKey) -> StoreTask<Vec<Bson>> {
        let collection = Arc::clone(&self.collection);
        let (id, name) = (self.id, self.name.clone());
        Task::new(move || {
            traced(id, name, "distinct", async move {
                collection.distinct(&key).await
            })
        })
    }

    /// Inserts a document or batch and resolves with the driver's
    /// acknowledgement.
    pub fn insert(&self, payload: impl Into<InsertPayload>) -> StoreTask<InsertAck> {
        let collection = Arc::clone(&self.collection);
        let (id, name) = (self.id, self.name.clone());
        let captured: InsertPayload = payload.into();
        Task::new(move || {
            traced(id, name, "insert", async move {
                collection.insert(captured).await
            })
        })
    }

    /// Releases the connection and resolves with `value` unchanged.
    ///
    /// Closing an already released reference does nothing and still
    /// resolves with `value`, so `close` can end any chain without altering
    /// its success value.
    pub fn close<A>(&self, value: A) -> Task<A, Infallible>
    where
        A: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        let released = Arc::clone(&self.released);
        let (id, name) = (self.id, self.name.clone());
        Task::new(move || async move {
            if released.swap(true, Ordering::AcqRel) {
                debug!(connection_id = %id, collection = %name, "connection already released");
            } else {
                debug!(
                    connection_id = %id,
                    collection = %name,
                    stage = %ChainStage::Closing,
                    "closing connection"
                );
                connection.close().await;
            }
            Ok(value)
        })
    }
}

async fn traced<T, F>(
    id: ConnectionId,
    name: CollectionName,
    operation: &'static str,
    work: F,
) -> DriverResult<T>
where
    F: Future<Output = DriverResult<T>>,
{
    debug!(
        connection_id = %id,
        collection = %name,
        stage = %ChainStage::Operating,
        operation,
        "running operation"
    );
    let outcome = work.await;
    if let Err(error) = &outcome {
        warn!(
            connection_id = %id,
            collection = %name,
            stage = %ChainStage::Operating,
            operation,
            %error,
            "operation failed"
        );
    }
    outcome
}

impl<C: DriverConnection> Clone for CollectionRef<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            connection: Arc::clone(&self.connection),
            collection: Arc::clone(&self.collection),
            released: Arc::clone(&self.released),
        }
    }
}

impl<C: DriverConnection> fmt::Debug for CollectionRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionRef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
