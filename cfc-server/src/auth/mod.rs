//! OAuth login and sessions
//!
//! - `tokens`: HS256 session and state tokens
//! - `cookies`: `session` / `oauth_state` cookie handling
//! - `accounts`: users and sessions in the auth database
//! - `github`, `discord`: provider HTTP calls

pub mod accounts;
pub mod cookies;
pub mod discord;
pub mod github;
pub mod tokens;

pub use accounts::{Accounts, ProviderId, ProviderIdentity};
pub use tokens::{SessionClaims, TokenSigner};

use serde::Deserialize;

use crate::error::ApiError;

/// Token endpoint response shared by both providers
///
/// Both report failures with a 200 and an `error` body, so a missing token is
/// checked explicitly.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_access_token(self) -> Result<String, ApiError> {
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ApiError::provider(format!(
                "failed to get access token: {}",
                self.error_description
                    .or(self.error)
                    .unwrap_or_else(|| "no token in response".to_string())
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_error_body() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
        )
        .unwrap();
        assert!(response.into_access_token().is_err());
    }

    #[test]
    fn token_response_success() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"gho_abc","token_type":"bearer"}"#).unwrap();
        assert_eq!(response.into_access_token().unwrap(), "gho_abc");
    }
}
