//! Custom Axum extractors

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use cfc_store::ErrorKind;
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::auth::cookies::{read_cookie, SESSION_COOKIE};
use crate::error::ApiError;
use crate::models::{Session, User, ValidationError};
use crate::state::AppState;

/// JSON body that must deserialize into `T`; otherwise 400
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ValidationError::Body {
                reason: e.body_text(),
            })?;
        Ok(Self(value))
    }
}

/// Signed-in user with an unexpired session
pub struct Authenticated {
    pub user: User,
    pub session: Session,
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = read_cookie(&parts.headers, SESSION_COOKIE).ok_or(ApiError::Unauthorized {
            reason: "no session token provided",
        })?;

        let claims = state.tokens().verify_session(&token).ok_or_else(|| {
            tracing::warn!("rejected invalid session token");
            ApiError::Unauthorized {
                reason: "invalid session token",
            }
        })?;

        let session = state
            .accounts()
            .active_session(&claims.sub, Utc::now())
            .await?
            .ok_or(ApiError::Unauthorized {
                reason: "no active session",
            })?;

        let user = match state.accounts().user(&claims.sub).await {
            Ok(user) => user,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(user_id = %claims.sub, "session for a user that no longer exists");
                return Err(ApiError::Unauthorized {
                    reason: "invalid session token",
                });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { user, session })
    }
}
