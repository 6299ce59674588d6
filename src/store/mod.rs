//! Deferred access to a document store.
//!
//! [`services::TaskAdapter`] turns the driver's connect, find, distinct,
//! insert, and close calls into [`crate::deferred::Task`] values. Each
//! operation runs as its own connect-operate-close chain, and the close
//! step runs whether the operation succeeds or fails. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
