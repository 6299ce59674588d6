//! In-memory driver adapter with connection accounting.

use super::matching::{distinct_values, matches, validate_filter};
use crate::store::{
    adapters::MissingDatabaseError,
    domain::{CollectionName, DatabaseName, FieldKey, InsertAck, InsertPayload, StoreConfig},
    ports::{
        DocumentCursor, DocumentDriver, DriverCollection, DriverConnection, DriverError,
        DriverResult,
    },
};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use mongodb::bson::{Bson, Document, oid::ObjectId};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, RwLock};

/// Driver call that an injected failure targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// [`DocumentDriver::connect`].
    Connect,
    /// [`DriverCollection::find`], before a cursor exists.
    Find,
    /// Draining the cursor returned by `find`, after every stored match.
    Cursor,
    /// [`DriverCollection::distinct`].
    Distinct,
    /// [`DriverCollection::insert`].
    Insert,
}

/// Snapshot of connection activity seen by an [`InMemoryDocumentDriver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Calls to `connect`, successful or not.
    pub connect_attempts: usize,
    /// Connections successfully opened.
    pub opened: usize,
    /// Connections released through `close`.
    pub closed: usize,
    /// Connections opened and not yet released.
    pub open: usize,
}

/// In-memory document-store driver.
///
/// Databases and collections spring into existence on first write. Every
/// driver call yields to the runtime once, standing in for the network
/// round trip, so concurrent chains interleave the way they would against
/// a server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentDriver {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    databases: HashMap<String, HashMap<String, Vec<Document>>>,
    connect_attempts: usize,
    next_session: u64,
    open_sessions: HashSet<u64>,
    opened: usize,
    closed: usize,
    failures: HashMap<FailureStage, String>,
}

impl InMemoryStoreState {
    fn collection(&self, database: &str, collection: &str) -> Option<&Vec<Document>> {
        self.databases.get(database)?.get(collection)
    }

    fn ensure_open(&self, session: u64) -> DriverResult<()> {
        if self.open_sessions.contains(&session) {
            return Ok(());
        }
        Err(DriverError::operation(io::Error::new(
            io::ErrorKind::NotConnected,
            format!("connection {session} is closed"),
        )))
    }

    fn take_failure(&mut self, stage: FailureStage) -> Option<io::Error> {
        self.failures.remove(&stage).map(io::Error::other)
    }
}

fn lock_error(err: impl ToString) -> io::Error {
    io::Error::other(err.to_string())
}

impl InMemoryDocumentDriver {
    /// Creates an empty in-memory driver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends documents to a collection, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns driver operation errors when lock acquisition fails.
    pub fn seed(
        &self,
        database: &DatabaseName,
        collection: &CollectionName,
        documents: impl IntoIterator<Item = Document>,
    ) -> DriverResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DriverError::operation(lock_error(err)))?;
        state
            .databases
            .entry(database.as_str().to_owned())
            .or_default()
            .entry(collection.as_str().to_owned())
            .or_default()
            .extend(documents);
        Ok(())
    }

    /// Returns a copy of every document stored in a collection.
    ///
    /// # Errors
    ///
    /// Returns driver operation errors when lock acquisition fails.
    pub fn documents(
        &self,
        database: &DatabaseName,
        collection: &CollectionName,
    ) -> DriverResult<Vec<Document>> {
        let state = self
            .state
            .read()
            .map_err(|err| DriverError::operation(lock_error(err)))?;
        Ok(state
            .collection(database.as_str(), collection.as_str())
            .cloned()
            .unwrap_or_default())
    }

    /// Makes the next driver call at `stage` fail with `message`.
    ///
    /// Each injected failure fires once. Injecting again for the same stage
    /// replaces the pending message.
    ///
    /// # Errors
    ///
    /// Returns driver operation errors when lock acquisition fails.
    pub fn fail_next(&self, stage: FailureStage, message: impl Into<String>) -> DriverResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DriverError::operation(lock_error(err)))?;
        state.failures.insert(stage, message.into());
        Ok(())
    }

    /// Returns connection counters accumulated since creation.
    ///
    /// # Errors
    ///
    /// Returns driver operation errors when lock acquisition fails.
    pub fn stats(&self) -> DriverResult<ConnectionStats> {
        let state = self
            .state
            .read()
            .map_err(|err| DriverError::operation(lock_error(err)))?;
        Ok(ConnectionStats {
            connect_attempts: state.connect_attempts,
            opened: state.opened,
            closed: state.closed,
            open: state.open_sessions.len(),
        })
    }
}

/// Extracts the database from the path segment of `scheme://host/database`.
fn database_from_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let (_, path) = rest.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();
    (!name.is_empty()).then_some(name)
}

fn resolve_database(config: &StoreConfig) -> DriverResult<String> {
    let url = config.url().as_str();
    if !url.contains("://") {
        return Err(DriverError::connect(io::Error::new(
            io::ErrorKind::InvalidInput,
            "malformed connection URL: missing scheme",
        )));
    }
    config
        .database()
        .map(|name| name.as_str().to_owned())
        .or_else(|| database_from_url(url).map(str::to_owned))
        .ok_or_else(|| DriverError::connect(MissingDatabaseError))
}

#[async_trait]
impl DocumentDriver for InMemoryDocumentDriver {
    type Connection = InMemoryConnection;

    async fn connect(&self, config: &StoreConfig) -> DriverResult<InMemoryConnection> {
        {
            let mut state = self
                .state
                .write()
                .map_err(|err| DriverError::connect(lock_error(err)))?;
            state.connect_attempts += 1;
        }
        tokio::task::yield_now().await;

        let database = resolve_database(config)?;
        let mut state = self
            .state
            .write()
            .map_err(|err| DriverError::connect(lock_error(err)))?;
        if let Some(err) = state.take_failure(FailureStage::Connect) {
            return Err(DriverError::connect(err));
        }

        state.next_session += 1;
        let session = state.next_session;
        state.open_sessions.insert(session);
        state.opened += 1;
        Ok(InMemoryConnection {
            session,
            database,
            state: Arc::clone(&self.state),
        })
    }
}

/// Connection handle issued by [`InMemoryDocumentDriver`].
#[derive(Debug, Clone)]
pub struct InMemoryConnection {
    session: u64,
    database: String,
    state: Arc<RwLock<InMemoryStoreState>>,
}

impl InMemoryConnection {
    /// Returns the driver-assigned session number, unique per driver.
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }

    /// Returns the database this connection resolves collections against.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }
}

#[async_trait]
impl DriverConnection for InMemoryConnection {
    type Collection = InMemoryCollection;

    fn collection(&self, name: &CollectionName) -> InMemoryCollection {
        InMemoryCollection {
            session: self.session,
            database: self.database.clone(),
            name: name.as_str().to_owned(),
            state: Arc::clone(&self.state),
        }
    }

    async fn close(&self) {
        tokio::task::yield_now().await;
        // A poisoned lock leaves the session counted as open.
        if let Ok(mut state) = self.state.write() {
            if state.open_sessions.remove(&self.session) {
                state.closed += 1;
            }
        }
    }
}

/// Collection handle issued by [`InMemoryConnection`].
#[derive(Debug, Clone)]
pub struct InMemoryCollection {
    session: u64,
    database: String,
    name: String,
    state: Arc<RwLock<InMemoryStoreState>>,
}

impl InMemoryCollection {
    fn check_call(&self, stage: FailureStage) -> DriverResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DriverError::operation(lock_error(err)))?;
        state.ensure_open(self.session)?;
        state
            .take_failure(stage)
            .map_or(Ok(()), |err| Err(DriverError::operation(err)))
    }
}

#[async_trait]
impl DriverCollection for InMemoryCollection {
    async fn find(&self, filter: Document) -> DriverResult<DocumentCursor> {
        tokio::task::yield_now().await;
        self.check_call(FailureStage::Find)?;
        validate_filter(&filter).map_err(DriverError::operation)?;

        let mut state = self
            .state
            .write()
            .map_err(|err| DriverError::operation(lock_error(err)))?;
        let matched: Vec<DriverResult<Document>> = state
            .collection(&self.database, &self.name)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, &filter))
                    .cloned()
                    .map(Ok)
                    .collect()
            })
            .unwrap_or_default();
        let trailing_error = state
            .take_failure(FailureStage::Cursor)
            .map(|err| Err(DriverError::operation(err)));

        Ok(stream::iter(matched.into_iter().chain(trailing_error)).boxed())
    }

    async fn distinct(&self, key: &FieldKey) -> DriverResult<Vec<Bson>> {
        tokio::task::yield_now().await;
        self.check_call(FailureStage::Distinct)?;

        let state = self
            .state
            .read()
            .map_err(|err| DriverError::operation(lock_error(err)))?;
        Ok(state
            .collection(&self.database, &self.name)
            .map(|documents| distinct_values(documents, key))
            .unwrap_or_default())
    }

    async fn insert(&self, payload: InsertPayload) -> DriverResult<InsertAck> {
        tokio::task::yield_now().await;
        self.check_call(FailureStage::Insert)?;

        let mut state = self
            .state
            .write()
            .map_err(|err| DriverError::operation(lock_error(err)))?;
        let stored = state
            .databases
            .entry(self.database.clone())
            .or_default()
            .entry(self.name.clone())
            .or_default();

        let prepared: Vec<(Bson, Document)> =
            payload.into_documents().into_iter().map(with_object_id).collect();
        for (index, (id, _)) in prepared.iter().enumerate() {
            let clashes_stored = stored.iter().any(|document| document.get("_id") == Some(id));
            let clashes_batch = prepared.iter().take(index).any(|(earlier, _)| earlier == id);
            if clashes_stored || clashes_batch {
                return Err(DriverError::operation(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("duplicate key: _id {id}"),
                )));
            }
        }

        let mut inserted_ids = Vec::with_capacity(prepared.len());
        for (id, document) in prepared {
            inserted_ids.push(id);
            stored.push(document);
        }
        Ok(InsertAck::new(inserted_ids))
    }
}

/// Places an `_id` first in the document, generating one when absent.
fn with_object_id(document: Document) -> (Bson, Document) {
    let id = document
        .get("_id")
        .cloned()
        .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));
    let mut stored = Document::new();
    stored.insert("_id", id.clone());
    for (key, value) in document {
        if key != "_id" {
            stored.insert(key, value);
        }
    }
    (id, stored)
}
