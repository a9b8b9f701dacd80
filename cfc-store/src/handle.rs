//! Database and collection handles
//!
//! A [`DatabaseHandle`] wraps one live backend connection and caches one
//! [`CollectionHandle`] per collection name. Collection handles share the
//! database handle's liveness flag: once the database shuts down, every
//! handle it ever gave out fails with `NotInitialized`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use mongodb::bson::{Bson, Document};

use crate::backend::{CollectionBackend, DatabaseBackend, ServerInfo, UpdateOutcome};
use crate::error::{Result, StoreError};

/// Handle to one logical database
pub struct DatabaseHandle {
    name: String,
    live: Arc<AtomicBool>,
    backend: RwLock<Option<Arc<dyn DatabaseBackend>>>,
    collections: Mutex<HashMap<String, CollectionHandle>>,
}

impl std::fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseHandle")
            .field("name", &self.name)
            .field("live", &self.is_live())
            .finish()
    }
}

impl DatabaseHandle {
    pub(crate) fn new(name: impl Into<String>, backend: Arc<dyn DatabaseBackend>) -> Self {
        Self {
            name: name.into(),
            live: Arc::new(AtomicBool::new(true)),
            backend: RwLock::new(Some(backend)),
            collections: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn backend(&self) -> Result<Arc<dyn DatabaseBackend>> {
        self.backend
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or_else(|| StoreError::not_initialized(&self.name))
    }

    /// Get the handle for a collection, creating and caching it on first use.
    pub fn collection(&self, name: &str) -> Result<CollectionHandle> {
        let backend = self.backend()?;
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::failure("collection", "collection cache poisoned"))?;

        let handle = collections
            .entry(name.to_owned())
            .or_insert_with(|| CollectionHandle {
                database: self.name.clone(),
                name: name.to_owned(),
                live: self.live.clone(),
                inner: backend.collection(name),
            });

        Ok(handle.clone())
    }

    /// Number of cached collection handles.
    pub fn cached_collections(&self) -> usize {
        self.collections.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub async fn server_info(&self) -> Result<ServerInfo> {
        self.backend()?.server_info().await
    }

    /// Close the connection and invalidate every cached collection handle.
    pub(crate) async fn shutdown(&self) {
        self.live.store(false, Ordering::SeqCst);

        if let Ok(mut collections) = self.collections.lock() {
            collections.clear();
        }

        let backend = self.backend.write().ok().and_then(|mut guard| guard.take());
        if let Some(backend) = backend {
            backend.close().await;
        }
    }
}

/// Handle to one collection inside a live database
#[derive(Clone)]
pub struct CollectionHandle {
    database: String,
    name: String,
    live: Arc<AtomicBool>,
    inner: Arc<dyn CollectionBackend>,
}

impl std::fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("database", &self.database)
            .field("name", &self.name)
            .finish()
    }
}

impl CollectionHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether both handles share the same underlying collection.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn live(&self) -> Result<&Arc<dyn CollectionBackend>> {
        if self.live.load(Ordering::SeqCst) {
            Ok(&self.inner)
        } else {
            Err(StoreError::not_initialized(&self.database))
        }
    }

    pub async fn find(&self, filter: Document) -> Result<Vec<Document>> {
        self.live()?.find(filter).await
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<Document>> {
        self.live()?.find_one(filter).await
    }

    pub async fn insert_one(&self, doc: Document) -> Result<Bson> {
        self.live()?.insert_one(doc).await
    }

    pub async fn update_one(&self, filter: Document, set: Document) -> Result<UpdateOutcome> {
        self.live()?.update_one(filter, set).await
    }

    pub async fn delete_one(&self, filter: Document) -> Result<u64> {
        self.live()?.delete_one(filter).await
    }
}
