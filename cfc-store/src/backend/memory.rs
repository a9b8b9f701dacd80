// In-memory backend: HashMap-based document store.
//
// Stores documents in `HashMap<String, Vec<Document>>` keyed by collection
// name, one map per logical database. Thread-safe via `tokio::sync::RwLock`.
// Data outlives individual connections so a database reopened after shutdown
// sees what was written before.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use super::{CollectionBackend, Connector, DatabaseBackend, ServerInfo, UpdateOutcome};
use crate::error::{Result, StoreError};
use crate::id::{internal_to_external, INTERNAL_ID_FIELD};

type Collections = HashMap<String, Vec<Document>>;

/// Connector for the in-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    databases: Arc<Mutex<HashMap<String, Arc<RwLock<Collections>>>>>,
    connects: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connections opened so far (for diagnostics and tests).
    pub fn connection_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, database: &str) -> Result<Arc<dyn DatabaseBackend>> {
        // Yield once so concurrent callers genuinely interleave with a connect
        tokio::task::yield_now().await;

        let data = {
            let mut databases = self
                .databases
                .lock()
                .map_err(|_| StoreError::failure("connect", "memory store poisoned"))?;
            databases.entry(database.to_owned()).or_default().clone()
        };
        self.connects.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(database, "in-memory database opened");

        Ok(Arc::new(MemoryDatabase { data }))
    }
}

/// One logical in-memory database
pub struct MemoryDatabase {
    data: Arc<RwLock<Collections>>,
}

#[async_trait]
impl DatabaseBackend for MemoryDatabase {
    fn collection(&self, name: &str) -> Arc<dyn CollectionBackend> {
        Arc::new(MemoryCollection {
            name: name.to_owned(),
            data: self.data.clone(),
        })
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        Ok(ServerInfo {
            version: format!("memory-{}", env!("CARGO_PKG_VERSION")),
        })
    }

    async fn close(&self) {}
}

/// One in-memory collection
pub struct MemoryCollection {
    name: String,
    data: Arc<RwLock<Collections>>,
}

/// Resolve a possibly dotted field path (`metadata.type`) inside a document.
fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Field-equality match against every constraint in the filter.
///
/// A missing field matches `null`, as it does in MongoDB.
fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(path, expected)| match lookup(doc, path) {
        Some(value) => value == expected,
        None => *expected == Bson::Null,
    })
}

#[async_trait]
impl CollectionBackend for MemoryCollection {
    async fn find(&self, filter: Document) -> Result<Vec<Document>> {
        let data = self.data.read().await;
        Ok(data
            .get(&self.name)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>> {
        let data = self.data.read().await;
        Ok(data
            .get(&self.name)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn insert_one(&self, doc: Document) -> Result<Bson> {
        let id = match doc.get(INTERNAL_ID_FIELD) {
            Some(id) => id.clone(),
            None => Bson::ObjectId(ObjectId::new()),
        };

        let mut data = self.data.write().await;
        let docs = data.entry(self.name.clone()).or_default();

        if docs.iter().any(|d| d.get(INTERNAL_ID_FIELD) == Some(&id)) {
            let shown = match &id {
                Bson::ObjectId(oid) => internal_to_external(oid),
                other => other.to_string(),
            };
            return Err(StoreError::conflict(&self.name, shown));
        }

        let mut stored = Document::new();
        stored.insert(INTERNAL_ID_FIELD, id.clone());
        for (key, value) in doc {
            if key != INTERNAL_ID_FIELD {
                stored.insert(key, value);
            }
        }
        docs.push(stored);

        Ok(id)
    }

    async fn update_one(&self, filter: Document, set: Document) -> Result<UpdateOutcome> {
        let mut data = self.data.write().await;
        let Some(target) = data
            .get_mut(&self.name)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)))
        else {
            return Ok(UpdateOutcome::default());
        };

        let before = target.clone();
        for (key, value) in set {
            target.insert(key, value);
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(*target != before),
        })
    }

    async fn delete_one(&self, filter: Document) -> Result<u64> {
        let mut data = self.data.write().await;
        let Some(docs) = data.get_mut(&self.name) else {
            return Ok(0);
        };

        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
