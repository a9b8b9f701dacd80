//! MongoDB backend using the official driver
//!
//! One `Client` per logical database name; the registry guarantees it is
//! created once. Collections are cheap driver handles.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, Collection, Database};
use tokio::sync::Mutex;

use super::{CollectionBackend, Connector, DatabaseBackend, ServerInfo, UpdateOutcome};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::id::internal_to_external;

/// Server error code for a unique index violation
const DUPLICATE_KEY: i32 = 11000;

/// Connects to MongoDB using the configured URI.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    config: StoreConfig,
}

impl MongoConnector {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Build a connector from the process environment.
    ///
    /// Fails with a configuration error when `MONGODB` is not set.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(StoreConfig::from_env()?))
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, database: &str) -> Result<Arc<dyn DatabaseBackend>> {
        let client = Client::with_uri_str(&self.config.uri)
            .await
            .map_err(|e| StoreError::failure("connect", e))?;
        let db = client.database(database);
        tracing::info!(database, "MongoDB client created");

        Ok(Arc::new(MongoDatabase {
            db,
            client: Mutex::new(Some(client)),
        }))
    }
}

/// One connected logical database
pub struct MongoDatabase {
    db: Database,
    client: Mutex<Option<Client>>,
}

#[async_trait]
impl DatabaseBackend for MongoDatabase {
    fn collection(&self, name: &str) -> Arc<dyn CollectionBackend> {
        Arc::new(MongoCollection {
            name: name.to_owned(),
            inner: self.db.collection::<Document>(name),
        })
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        let info = self
            .db
            .run_command(doc! { "buildInfo": 1 })
            .await
            .map_err(|e| StoreError::failure("buildInfo", e))?;

        Ok(ServerInfo {
            version: info.get_str("version").unwrap_or("unknown").to_owned(),
        })
    }

    async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            client.shutdown().await;
            tracing::info!(database = %self.db.name(), "MongoDB client closed");
        }
    }
}

/// Driver collection wrapper
pub struct MongoCollection {
    name: String,
    inner: Collection<Document>,
}

#[async_trait]
impl CollectionBackend for MongoCollection {
    async fn find(&self, filter: Document) -> Result<Vec<Document>> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| StoreError::failure("find", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::failure("find", e))
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| StoreError::failure("find_one", e))
    }

    async fn insert_one(&self, doc: Document) -> Result<Bson> {
        let requested_id = doc.get_object_id("_id").ok();

        match self.inner.insert_one(doc).await {
            Ok(result) => Ok(result.inserted_id),
            Err(e) if is_duplicate_key(&e) => {
                let id = requested_id
                    .map(|oid| internal_to_external(&oid))
                    .unwrap_or_default();
                Err(StoreError::conflict(&self.name, id))
            }
            Err(e) => Err(StoreError::failure("insert_one", e)),
        }
    }

    async fn update_one(&self, filter: Document, set: Document) -> Result<UpdateOutcome> {
        let result = self
            .inner
            .update_one(filter, doc! { "$set": set })
            .await
            .map_err(|e| StoreError::failure("update_one", e))?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, filter: Document) -> Result<u64> {
        let result = self
            .inner
            .delete_one(filter)
            .await
            .map_err(|e| StoreError::failure("delete_one", e))?;

        Ok(result.deleted_count)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == DUPLICATE_KEY
    )
}
