//! Port contracts for the external document-store driver.
//!
//! The driver is an opaque collaborator reached through three traits:
//! connect, bind a collection, and run find/distinct/insert against it.

mod driver;

pub use driver::{
    DocumentCursor, DocumentDriver, DriverCollection, DriverConnection, DriverError, DriverResult,
};

#[cfg(test)]
pub use driver::{MockDocumentDriver, MockDriverCollection, MockDriverConnection};
