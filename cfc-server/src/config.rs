//! Server and OAuth configuration
//!
//! Environment variables:
//! - `JWT_SECRET_KEY`: HS256 signing key for session and state tokens (required)
//! - `GH_CLIENT_ID`, `GH_CLIENT_SECRET`, `GH_CALLBACK_URL`: GitHub OAuth app
//! - `GITHUB_ORG`: organization invitations are sent for (default `coders-for-coders`)
//! - `DISCORD_CLIENT_ID`, `DISCORD_CLIENT_SECRET`, `DISCORD_CALLBACK_URL`: Discord OAuth app
//!
//! A provider with any of its three values missing is disabled.

use std::net::SocketAddr;

use crate::error::ServerError;

pub const DEFAULT_CONTENT_DATABASE: &str = "cfc_db";
pub const DEFAULT_AUTH_DATABASE: &str = "auth_db";
pub const DEFAULT_GITHUB_ORG: &str = "coders-for-coders";

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Allow any origin (no credentials) instead of the localhost allowlist
    pub cors_permissive: bool,
    /// Database holding resources, posts and quiz questions
    pub content_database: String,
    /// Database holding users and sessions
    pub auth_database: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            cors_permissive: false,
            content_database: DEFAULT_CONTENT_DATABASE.to_string(),
            auth_database: DEFAULT_AUTH_DATABASE.to_string(),
        }
    }
}

/// Credentials of one OAuth application
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl ProviderConfig {
    fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
        id_key: &str,
        secret_key: &str,
        callback_key: &str,
    ) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            client_id: get(id_key)?,
            client_secret: get(secret_key)?,
            callback_url: get(callback_key)?,
        })
    }
}

/// Session signing and OAuth provider settings
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub github: Option<ProviderConfig>,
    pub discord: Option<ProviderConfig>,
    pub github_org: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("github", &self.github.is_some())
            .field("discord", &self.discord.is_some())
            .field("github_org", &self.github_org)
            .finish()
    }
}

impl AuthConfig {
    /// Config with only a signing key; both providers disabled.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            github: None,
            discord: None,
            github_org: DEFAULT_GITHUB_ORG.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let jwt_secret = lookup("JWT_SECRET_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ServerError::Config("JWT_SECRET_KEY environment variable not set".into()))?;

        let github = ProviderConfig::from_lookup(
            &lookup,
            "GH_CLIENT_ID",
            "GH_CLIENT_SECRET",
            "GH_CALLBACK_URL",
        );
        let discord = ProviderConfig::from_lookup(
            &lookup,
            "DISCORD_CLIENT_ID",
            "DISCORD_CLIENT_SECRET",
            "DISCORD_CALLBACK_URL",
        );
        let github_org = lookup("GITHUB_ORG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_ORG.to_string());

        if github.is_none() {
            tracing::warn!("GitHub OAuth not configured, GitHub login disabled");
        }
        if discord.is_none() {
            tracing::warn!("Discord OAuth not configured, Discord login disabled");
        }

        Ok(Self {
            jwt_secret,
            github,
            discord,
            github_org,
        })
    }
}
