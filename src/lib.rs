//! Doctask: deferred, composable access to a document database.
//!
//! This crate describes database work as values. Asking for a query, an
//! insert, or a distinct-value lookup returns a [`deferred::Task`]; nothing
//! connects to the database until that task is run.
//!
//! ```no_run
//! use doctask::bson::doc;
//! use doctask::store::{
//!     adapters::mongo::MongoDriver,
//!     domain::{CollectionName, StoreConfig, StoreUrl},
//!     services::TaskAdapter,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = StoreConfig::new(StoreUrl::new("mongodb://localhost:27017/shop")?);
//! let adapter = TaskAdapter::new(Arc::new(MongoDriver::new()), config);
//!
//! let task = adapter
//!     .find(doc! { "status": "open" })
//!     .from(CollectionName::new("orders")?)
//!     .map(|orders| orders.len());
//!
//! // Nothing has touched the network yet.
//! let open_orders = task.run().await?;
//! # let _ = open_orders;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Doctask follows hexagonal architecture principles:
//!
//! - **Domain**: validated names, configuration, and insert payloads
//! - **Ports**: the driver contract the adapter consumes
//! - **Adapters**: in-memory and `mongodb` drivers
//!
//! # Modules
//!
//! - [`deferred`]: the lazy task type and its combinators
//! - [`store`]: the task adapter over a document-store driver

pub mod deferred;
pub mod store;

pub use mongodb::bson;
