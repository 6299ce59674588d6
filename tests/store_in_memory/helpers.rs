//! Shared fixtures for in-memory adapter integration tests.

use doctask::bson::Document;
use doctask::store::{
    adapters::memory::{ConnectionStats, InMemoryDocumentDriver},
    domain::{CollectionName, DatabaseName, StoreConfig, StoreUrl},
    services::TaskAdapter,
};
use rstest::fixture;
use std::sync::Arc;

/// Adapter wired to an in-memory driver, plus the names it resolves.
pub struct StoreHarness {
    pub driver: Arc<InMemoryDocumentDriver>,
    pub adapter: TaskAdapter<InMemoryDocumentDriver>,
    pub database: DatabaseName,
    pub collection: CollectionName,
}

impl StoreHarness {
    /// Appends documents to the harness collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver state cannot be written.
    pub fn seed(&self, documents: impl IntoIterator<Item = Document>) -> eyre::Result<()> {
        self.driver
            .seed(&self.database, &self.collection, documents)?;
        Ok(())
    }

    /// Returns everything stored in the harness collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver state cannot be read.
    pub fn stored(&self) -> eyre::Result<Vec<Document>> {
        Ok(self.driver.documents(&self.database, &self.collection)?)
    }

    /// Returns the driver's connection counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver state cannot be read.
    pub fn stats(&self) -> eyre::Result<ConnectionStats> {
        Ok(self.driver.stats()?)
    }
}

/// Provides a harness whose URL names the `inventory` database.
#[fixture]
pub fn harness() -> StoreHarness {
    let driver = Arc::new(InMemoryDocumentDriver::new());
    let url = StoreUrl::new("memory://localhost:27017/inventory").expect("valid url");
    let adapter = TaskAdapter::new(Arc::clone(&driver), StoreConfig::new(url));
    StoreHarness {
        driver,
        adapter,
        database: DatabaseName::new("inventory").expect("valid database name"),
        collection: CollectionName::new("items").expect("valid collection name"),
    }
}
