//! Connection registry - one database handle per logical database name
//!
//! The registry is created once at startup and shared (`Arc`) with every
//! component that needs store access. It is the only place database handles
//! are created; a per-name `OnceCell` serialises the connect so concurrent
//! first callers end up sharing a single connection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::backend::{Connector, MemoryConnector, MongoConnector};
use crate::error::{Result, StoreError};
use crate::handle::DatabaseHandle;

type Slot = Arc<OnceCell<Arc<DatabaseHandle>>>;

/// Process-wide map of database name → handle
pub struct ConnectionRegistry {
    connector: Arc<dyn Connector>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("databases", &self.databases())
            .finish()
    }
}

impl ConnectionRegistry {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self::with_connector(Arc::new(connector))
    }

    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Registry backed by MongoDB, reading `MONGODB` now.
    ///
    /// A missing URI is a configuration error; callers treat it as fatal.
    pub fn mongo_from_env() -> Result<Self> {
        Ok(Self::new(MongoConnector::from_env()?))
    }

    /// Registry backed by the in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryConnector::new())
    }

    fn slot(&self, name: &str) -> Result<Slot> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::failure("get_handle", "registry lock poisoned"))?;
        Ok(slots.entry(name.to_owned()).or_default().clone())
    }

    /// Get the handle for `name`, connecting on first use.
    ///
    /// Repeated calls return the same `Arc` without reconnecting. A handle
    /// whose slot was evicted by `shutdown` while connecting is closed and
    /// reported as not initialized.
    pub async fn get_handle(&self, name: &str) -> Result<Arc<DatabaseHandle>> {
        let slot = self.slot(name)?;

        let handle = slot
            .get_or_try_init(|| async {
                let backend = self.connector.connect(name).await?;
                tracing::info!(database = name, "database connected");
                Ok::<_, StoreError>(Arc::new(DatabaseHandle::new(name, backend)))
            })
            .await?
            .clone();

        if !self.is_registered(name, &slot) {
            handle.shutdown().await;
            tracing::info!(database = name, "connection closed after concurrent shutdown");
            return Err(StoreError::not_initialized(name));
        }

        Ok(handle)
    }

    fn is_registered(&self, name: &str, slot: &Slot) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.get(name).is_some_and(|s| Arc::ptr_eq(s, slot)))
            .unwrap_or(false)
    }

    /// Close the connection for `name` and evict its handle.
    ///
    /// No-op if the name was never requested.
    pub async fn shutdown(&self, name: &str) {
        let slot = match self.slots.lock() {
            Ok(mut slots) => slots.remove(name),
            Err(_) => None,
        };

        if let Some(handle) = slot.and_then(|s| s.get().cloned()) {
            handle.shutdown().await;
            tracing::info!(database = name, "database connection closed");
        }
    }

    /// Shut down every registered database.
    pub async fn shutdown_all(&self) {
        for name in self.databases() {
            self.shutdown(&name).await;
        }
    }

    /// Names of databases with a registry entry.
    pub fn databases(&self) -> Vec<String> {
        self.slots
            .lock()
            .map(|slots| slots.keys().cloned().collect())
            .unwrap_or_default()
    }
}
