//! User and session persistence in the auth database
//!
//! Users are matched by provider id (`github_id` or `discord_id`); a returning
//! user gets their profile fields refreshed. Sessions hold the provider access
//! token and are checked for expiry when read.

use chrono::{DateTime, Duration, Utc};
use cfc_store::{Document, RecordStore, Result};
use serde_json::{json, Value};

use super::tokens::SESSION_TTL_SECS;
use crate::models::{from_document, Session, User};

pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";

/// Account id on the OAuth provider
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderId {
    Github(i64),
    Discord(String),
}

impl ProviderId {
    fn field(&self) -> (&'static str, Value) {
        match self {
            Self::Github(id) => ("github_id", json!(id)),
            Self::Discord(id) => ("discord_id", json!(id)),
        }
    }
}

/// Profile reported by a provider after a successful code exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderIdentity {
    pub provider_id: ProviderId,
    pub username: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Users and sessions
#[derive(Debug, Clone)]
pub struct Accounts {
    store: RecordStore,
}

impl Accounts {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Create the user on first login, refresh their profile otherwise
    pub async fn upsert_user(&self, identity: ProviderIdentity, now: DateTime<Utc>) -> Result<User> {
        let (field, value) = identity.provider_id.field();

        let mut filter = Document::new();
        filter.insert(field.to_string(), value.clone());

        let existing = self.store.list(USERS, Some(&filter)).await?;

        let mut profile = Document::new();
        profile.insert("username".into(), json!(identity.username));
        profile.insert("email".into(), json!(identity.email));
        profile.insert("avatar".into(), json!(identity.avatar));
        profile.insert("updated_at".into(), json!(now));

        let doc = match existing.into_iter().next() {
            Some(user) => {
                let id = user_id_of(&user)?;
                tracing::debug!(user_id = %id, "refreshing user profile");
                self.store.update(USERS, &id, profile).await?
            }
            None => {
                let mut user = Document::new();
                user.insert(field.to_string(), value);
                user.extend(profile);
                user.insert("created_at".into(), json!(now));
                let created = self.store.create(USERS, user).await?;
                tracing::info!(username = %identity.username, "created user");
                created
            }
        };

        from_document(doc)
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let mut doc = Document::new();
        doc.insert("user_id".into(), json!(user_id));
        doc.insert("access_token".into(), json!(access_token));
        doc.insert(
            "expires_at".into(),
            json!(now + Duration::seconds(SESSION_TTL_SECS)),
        );

        from_document(self.store.create(SESSIONS, doc).await?)
    }

    /// The user's unexpired session with the latest expiry, if any
    pub async fn active_session(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<Session>> {
        let mut filter = Document::new();
        filter.insert("user_id".into(), json!(user_id));

        let mut active = Vec::new();
        for doc in self.store.list(SESSIONS, Some(&filter)).await? {
            let session: Session = from_document(doc)?;
            if session.is_active(now) {
                active.push(session);
            }
        }

        Ok(active.into_iter().max_by_key(|s| s.expires_at))
    }

    pub async fn user(&self, id: &str) -> Result<User> {
        from_document(self.store.get_by_id(USERS, id).await?)
    }
}

fn user_id_of(doc: &Document) -> Result<String> {
    doc.get(cfc_store::ID_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| cfc_store::StoreError::failure("upsert user", "stored user has no id"))
}
