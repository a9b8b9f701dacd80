//! HS256 tokens for login sessions and OAuth state
//!
//! A session token carries the user id in `sub` and lives 24 hours. A state
//! token carries a random nonce and lives 5 minutes; it is echoed back by the
//! provider and compared with the `oauth_state` cookie.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token and cookie lifetime
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// OAuth state token and cookie lifetime
pub const STATE_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// External id of the user
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateClaims {
    nonce: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies tokens with one shared secret
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.required_spec_claims = ["exp"].into_iter().map(String::from).collect();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue_session(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> jsonwebtoken::errors::Result<String> {
        let iat = now.timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat,
            exp: iat + SESSION_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Claims of a well-signed, unexpired session token
    pub fn verify_session(&self, token: &str) -> Option<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .ok()
    }

    pub fn issue_state(&self, now: DateTime<Utc>) -> jsonwebtoken::errors::Result<String> {
        let iat = now.timestamp();
        let claims = StateClaims {
            nonce: Uuid::new_v4().to_string(),
            iat,
            exp: iat + STATE_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// The state echoed by the provider must equal the cookie and still verify
    pub fn verify_state(&self, returned: &str, cookie: Option<&str>) -> bool {
        match cookie {
            Some(cookie) if cookie == returned => {
                decode::<StateClaims>(returned, &self.decoding, &self.validation).is_ok()
            }
            _ => false,
        }
    }
}
