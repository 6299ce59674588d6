//! In-memory document-store driver.

mod driver;
mod matching;

pub use driver::{
    ConnectionStats, FailureStage, InMemoryCollection, InMemoryConnection, InMemoryDocumentDriver,
};
