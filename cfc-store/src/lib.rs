//! cfc-store: document store access layer
//!
//! - [`ConnectionRegistry`]: one [`DatabaseHandle`] per logical database name
//! - [`RecordStore`]: list/get/create/update/delete with `_id` ↔ `id` translation
//! - [`backend`]: MongoDB and in-memory implementations behind one trait seam

pub mod backend;
pub mod config;
pub mod error;
pub mod handle;
pub mod id;
pub mod records;
pub mod registry;

pub use backend::{MemoryConnector, MongoConnector, ServerInfo};
pub use config::StoreConfig;
pub use error::{ErrorKind, Result, StoreError};
pub use handle::{CollectionHandle, DatabaseHandle};
pub use id::{Document, ID_FIELD};
pub use records::RecordStore;
pub use registry::ConnectionRegistry;
