//! Application state shared across handlers

use std::sync::Arc;
use std::time::{Duration, Instant};

use cfc_store::{ConnectionRegistry, RecordStore};

use crate::auth::{Accounts, TokenSigner};
use crate::config::{AuthConfig, ServerConfig};
use crate::error::ServerError;

/// Timeout for every outbound OAuth request
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Arc<ConnectionRegistry>,
    content: RecordStore,
    accounts: Accounts,
    auth: AuthConfig,
    tokens: TokenSigner,
    http: reqwest::Client,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        config: &ServerConfig,
        auth: AuthConfig,
    ) -> Result<Self, ServerError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("cfc-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let content = RecordStore::new(registry.clone(), config.content_database.clone());
        let accounts = Accounts::new(RecordStore::new(
            registry.clone(),
            config.auth_database.clone(),
        ));
        let tokens = TokenSigner::new(&auth.jwt_secret);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                registry,
                content,
                accounts,
                auth,
                tokens,
                http,
                started_at: Instant::now(),
            }),
        })
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.inner.registry
    }

    /// Resources, posts and quiz questions
    pub fn content(&self) -> &RecordStore {
        &self.inner.content
    }

    pub fn accounts(&self) -> &Accounts {
        &self.inner.accounts
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.inner.auth
    }

    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}
