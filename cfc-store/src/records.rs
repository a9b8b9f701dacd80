//! Record access operations - list, get, create, update, delete
//!
//! Every operation resolves Registry → Database Handle → Collection, runs a
//! single-document store primitive, and converts the result with
//! [`crate::id`]. Backend faults come back as [`StoreError`] values; nothing
//! store-native crosses this boundary.
//!
//! # Design Principles
//!
//! - Identifiers are translated in one place (`id::to_external` / `to_internal`)
//! - Writes re-read the stored document so callers see exactly what persisted
//! - No multi-document transactions; `update` is read-modify-write

use std::sync::Arc;

use mongodb::bson::{doc, Bson};

use crate::error::{Result, StoreError};
use crate::handle::CollectionHandle;
use crate::id::{self, Document, ID_FIELD, INTERNAL_ID_FIELD};
use crate::registry::ConnectionRegistry;

/// CRUD access to the collections of one logical database
#[derive(Debug, Clone)]
pub struct RecordStore {
    registry: Arc<ConnectionRegistry>,
    database: String,
}

impl RecordStore {
    pub fn new(registry: Arc<ConnectionRegistry>, database: impl Into<String>) -> Self {
        Self {
            registry,
            database: database.into(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    async fn collection(&self, name: &str) -> Result<CollectionHandle> {
        self.registry
            .get_handle(&self.database)
            .await?
            .collection(name)
    }

    /// List documents matching every field in `filter` (all when `None`).
    ///
    /// Order is whatever the store returns; an empty result is not an error.
    pub async fn list(&self, collection: &str, filter: Option<&Document>) -> Result<Vec<Document>> {
        let filter = match filter {
            Some(filter) => id::filter_to_internal(filter)
                .map_err(|e| StoreError::failure("list", format!("malformed filter: {}", e)))?,
            None => doc! {},
        };

        let docs = self.collection(collection).await?.find(filter).await?;
        tracing::debug!(collection, count = docs.len(), "listed documents");

        Ok(docs.into_iter().map(id::to_external).collect())
    }

    /// Fetch one document by external id.
    ///
    /// A malformed id is reported as not found.
    pub async fn get_by_id(&self, collection: &str, id: &str) -> Result<Document> {
        let oid = id::external_to_internal(id).map_err(|_| StoreError::not_found(collection, id))?;

        self.collection(collection)
            .await?
            .find_one(doc! { INTERNAL_ID_FIELD: oid })
            .await?
            .map(id::to_external)
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    /// Insert a document and return it as stored.
    ///
    /// A caller-supplied `id` becomes the stored identifier; otherwise the
    /// store assigns one. An existing identifier is a conflict.
    pub async fn create(&self, collection: &str, document: Document) -> Result<Document> {
        let stored = id::to_internal(document)
            .map_err(|e| StoreError::failure("create", e))?;

        let coll = self.collection(collection).await?;
        let inserted_id = coll.insert_one(stored).await?;

        let created = coll
            .find_one(doc! { INTERNAL_ID_FIELD: inserted_id.clone() })
            .await?
            .ok_or_else(|| StoreError::failure("create", "document missing after insert"))?;

        tracing::debug!(collection, id = %display_id(&inserted_id), "created document");
        Ok(id::to_external(created))
    }

    /// Set the given top-level fields on an existing document.
    ///
    /// Any `id` in `partial` is ignored; identifiers never change after
    /// creation.
    pub async fn update(&self, collection: &str, id: &str, partial: Document) -> Result<Document> {
        let oid = id::external_to_internal(id).map_err(|_| StoreError::not_found(collection, id))?;
        let filter = doc! { INTERNAL_ID_FIELD: oid };

        let mut fields = partial;
        fields.retain(|key, _| key != ID_FIELD && key != INTERNAL_ID_FIELD);
        let set = id::to_internal(fields).map_err(|e| StoreError::failure("update", e))?;

        let coll = self.collection(collection).await?;

        // An empty `$set` is rejected by the server; only existence matters then.
        if !set.is_empty() {
            let outcome = coll.update_one(filter.clone(), set).await?;
            if outcome.matched == 0 {
                return Err(StoreError::not_found(collection, id));
            }
        }

        let updated = coll
            .find_one(filter)
            .await?
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        tracing::debug!(collection, id, "updated document");
        Ok(id::to_external(updated))
    }

    /// Delete one document by id.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let oid = id::external_to_internal(id).map_err(|_| StoreError::not_found(collection, id))?;

        let deleted = self
            .collection(collection)
            .await?
            .delete_one(doc! { INTERNAL_ID_FIELD: oid })
            .await?;

        if deleted == 0 {
            return Err(StoreError::not_found(collection, id));
        }

        tracing::debug!(collection, id, "deleted document");
        Ok(true)
    }
}

fn display_id(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => id::internal_to_external(oid),
        other => other.to_string(),
    }
}
