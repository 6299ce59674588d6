//! Driver adapter over the official `mongodb` client.

mod driver;

pub use driver::{MongoCollection, MongoConnection, MongoDriver};
