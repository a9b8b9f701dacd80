//! Store configuration loaded from the environment
//!
//! - `MONGODB`: connection URI (required)

use crate::error::{Result, StoreError};

/// Environment variable holding the connection URI
pub const MONGODB_ENV: &str = "MONGODB";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub uri: String,
}

impl StoreConfig {
    /// Read the connection URI from `MONGODB`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable lookup (for testing).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match lookup(MONGODB_ENV) {
            Some(uri) if !uri.trim().is_empty() => Ok(Self { uri }),
            _ => Err(StoreError::config(format!(
                "{} environment variable not set",
                MONGODB_ENV
            ))),
        }
    }
}
