//! `mongodb`-backed driver adapter.

use crate::store::{
    adapters::MissingDatabaseError,
    domain::{CollectionName, FieldKey, InsertAck, InsertPayload, StoreConfig},
    ports::{
        DocumentCursor, DocumentDriver, DriverCollection, DriverConnection, DriverError,
        DriverResult,
    },
};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, Document, doc},
};

/// Driver that opens a fresh `mongodb` client per connection.
///
/// The client is pinged before the connection is handed out, so an
/// unreachable server or rejected credentials surface at connect time rather
/// than on the first operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDriver;

impl MongoDriver {
    /// Creates the driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentDriver for MongoDriver {
    type Connection = MongoConnection;

    async fn connect(&self, config: &StoreConfig) -> DriverResult<MongoConnection> {
        let client = Client::with_uri_str(config.url().as_str())
            .await
            .map_err(DriverError::connect)?;
        let database = match config.database() {
            Some(name) => client.database(name.as_str()),
            None => client
                .default_database()
                .ok_or_else(|| DriverError::connect(MissingDatabaseError))?,
        };
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(DriverError::connect)?;
        Ok(MongoConnection { client, database })
    }
}

/// Open `mongodb` client bound to one database.
#[derive(Debug, Clone)]
pub struct MongoConnection {
    client: Client,
    database: Database,
}

impl MongoConnection {
    /// Returns the database collections are resolved against.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }
}

#[async_trait]
impl DriverConnection for MongoConnection {
    type Collection = MongoCollection;

    fn collection(&self, name: &CollectionName) -> MongoCollection {
        MongoCollection(self.database.collection::<Document>(name.as_str()))
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}

/// Untyped `mongodb` collection handle.
#[derive(Debug, Clone)]
pub struct MongoCollection(Collection<Document>);

#[async_trait]
impl DriverCollection for MongoCollection {
    async fn find(&self, filter: Document) -> DriverResult<DocumentCursor> {
        let cursor = self.0.find(filter).await.map_err(DriverError::operation)?;
        Ok(cursor.map_err(DriverError::operation).boxed())
    }

    async fn distinct(&self, key: &FieldKey) -> DriverResult<Vec<Bson>> {
        self.0
            .distinct(key.as_str(), doc! {})
            .await
            .map_err(DriverError::operation)
    }

    async fn insert(&self, payload: InsertPayload) -> DriverResult<InsertAck> {
        match payload {
            InsertPayload::Single(document) => {
                let result = self
                    .0
                    .insert_one(document)
                    .await
                    .map_err(DriverError::operation)?;
                Ok(InsertAck::new(vec![result.inserted_id]))
            }
            InsertPayload::Batch(batch) => {
                let result = self
                    .0
                    .insert_many(batch.into_documents())
                    .await
                    .map_err(DriverError::operation)?;
                let mut indexed: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
                indexed.sort_unstable_by_key(|(index, _)| *index);
                Ok(InsertAck::new(indexed.into_iter().map(|(_, id)| id).collect()))
            }
        }
    }
}
