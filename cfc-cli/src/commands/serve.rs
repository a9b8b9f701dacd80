//! HTTP server command
//!
//! Builds the connection registry, loads auth configuration and serves the
//! API until Ctrl+C / SIGTERM, then closes every database connection.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use cfc_server::{run_server, AppState, AuthConfig, ServerConfig};
use cfc_store::ConnectionRegistry;
use clap::Parser;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "CFC_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins, no credentials) - use with caution
    #[arg(long, env = "CFC_CORS_PERMISSIVE")]
    pub cors_permissive: bool,

    /// Use the in-memory store instead of MongoDB (data is lost on exit)
    #[arg(long, env = "CFC_MEMORY")]
    pub memory: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let registry = if args.memory {
        tracing::warn!("Using in-memory store; nothing will be persisted");
        ConnectionRegistry::in_memory()
    } else {
        ConnectionRegistry::mongo_from_env()
            .context("MONGODB not set. Set it in the environment or .env, or pass --memory")?
    };
    let registry = Arc::new(registry);

    let auth = AuthConfig::from_env().context("Failed to load auth configuration")?;

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
        ..ServerConfig::default()
    };

    tracing::info!(
        content_db = %config.content_database,
        auth_db = %config.auth_database,
        "Starting cfc server on {}",
        config.bind_addr
    );

    let state = AppState::new(registry.clone(), &config, auth)
        .context("Failed to build application state")?;

    // Run server (blocks until shutdown)
    let result = run_server(state, config).await;

    registry.shutdown_all().await;
    result.context("Server error")
}
