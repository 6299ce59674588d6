//! Domain model for deferred document-store access.
//!
//! Validated names, configuration, insert payloads, and the stages a single
//! connect-operate-close chain moves through. Nothing in this module talks
//! to a database.

mod config;
mod error;
mod ids;
mod insert;
mod names;
mod stage;

pub use config::StoreConfig;
pub use error::{StoreConfigError, StoreDomainError};
pub use ids::ConnectionId;
pub use insert::{DocumentBatch, InsertAck, InsertPayload};
pub use names::{CollectionName, DatabaseName, FieldKey, StoreUrl};
pub use stage::ChainStage;
