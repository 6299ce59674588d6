//! Driver adapters for the store port.
//!
//! - [`memory`]: deterministic in-process driver for tests and local flows
//! - [`mongo`]: driver backed by the official `mongodb` client

pub mod memory;
pub mod mongo;

use thiserror::Error;

/// Neither the configuration nor the connection URL names a database.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("no database configured and none named in the connection URL")]
pub struct MissingDatabaseError;
