//! Application services exposing the driver as deferred tasks.

mod adapter;
mod collection;

pub use adapter::{BoundCollection, DistinctQuery, FindQuery, InsertCommand, TaskAdapter};
pub use collection::CollectionRef;

use crate::deferred::Task;
use crate::store::ports::DriverError;

/// Deferred store operation failing with the driver's error.
pub type StoreTask<T> = Task<T, DriverError>;
