//! cfc-server: HTTP API for Coders For Coders
//!
//! CRUD endpoints for resources, posts and quiz questions under `/api/data`,
//! GitHub and Discord OAuth login under `/api/auth`, and `/api/health`.
//! Storage goes through a shared [`cfc_store::ConnectionRegistry`].

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{AuthConfig, ProviderConfig, ServerConfig};
pub use error::{ApiError, ServerError};
pub use server::{build_router, run_server};
pub use state::AppState;
