//! Backend seam between the record layer and a concrete document database
//!
//! Backends speak BSON with store-native `_id` values; identifier translation
//! happens above this layer in [`crate::id`].

pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use crate::error::Result;

pub use memory::MemoryConnector;
pub use mongo::MongoConnector;

/// Outcome of a single-document update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Information reported by the database server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: String,
}

/// Opens one backend connection per logical database name.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, database: &str) -> Result<Arc<dyn DatabaseBackend>>;
}

/// A live connection to one logical database.
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn CollectionBackend>;

    async fn server_info(&self) -> Result<ServerInfo>;

    /// Release the underlying connection.
    async fn close(&self);
}

/// Single-document primitives on one collection.
///
/// Each call is atomic at the store; there are no multi-document guarantees.
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    async fn find(&self, filter: Document) -> Result<Vec<Document>>;

    async fn find_one(&self, filter: Document) -> Result<Option<Document>>;

    /// Insert and return the stored `_id`. Duplicate `_id` is a conflict.
    async fn insert_one(&self, doc: Document) -> Result<Bson>;

    /// Apply a field-level `$set` to the first match.
    async fn update_one(&self, filter: Document, set: Document) -> Result<UpdateOutcome>;

    /// Remove the first match and return the number of deleted documents.
    async fn delete_one(&self, filter: Document) -> Result<u64>;
}
