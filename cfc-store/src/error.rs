/// Structured error types for cfc-store.
///
/// Every backend fault is re-signalled as a `StoreError`. Callers that need to
/// branch on the failure (the HTTP layer mapping to status codes) use
/// [`StoreError::kind`], which collapses the variants onto a small, stable
/// taxonomy.

use thiserror::Error;

/// Main error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document matched, or the identifier was not well formed
    #[error("{collection} document '{id}' not found")]
    NotFound { collection: String, id: String },

    /// A document with the same identifier already exists
    #[error("{collection} document '{id}' already exists")]
    Conflict { collection: String, id: String },

    /// The database handle was shut down (or never connected)
    #[error("database '{database}' is not initialized")]
    NotInitialized { database: String },

    /// Any other backend fault: network, serialization, malformed filter
    #[error("{operation} failed: {reason}")]
    Failure {
        operation: &'static str,
        reason: String,
    },

    /// Required configuration is missing; fatal at startup
    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

/// Stable error taxonomy exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    StoreFailure,
    Configuration,
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a not-found error
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Conflict {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a not-initialized error
    pub fn not_initialized(database: impl Into<String>) -> Self {
        Self::NotInitialized {
            database: database.into(),
        }
    }

    /// Create a generic store failure
    pub fn failure(operation: &'static str, reason: impl ToString) -> Self {
        Self::Failure {
            operation,
            reason: reason.to_string(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotInitialized { .. } | Self::Failure { .. } => ErrorKind::StoreFailure,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }
}
