//! API error types with IntoResponse
//!
//! `ApiError::into_response` is the single table mapping error kinds to
//! status codes. Store and internal failures are logged in full and returned
//! as a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cfc_store::{ErrorKind, StoreError};
use serde_json::json;

use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Store error, mapped by kind (404 / 409 / 500)
    Store(StoreError),

    /// Missing or invalid session (401)
    Unauthorized { reason: &'static str },

    /// The OAuth provider rejected or failed a request (400)
    Provider { message: String },

    /// OAuth provider has no credentials configured (503)
    ProviderDisabled { provider: &'static str },

    /// Internal error (500)
    Internal { message: String },
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

fn internal_error() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({
            "error": "internal_error",
            "message": "an internal error occurred"
        }),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::Store(e) => match e.kind() {
                ErrorKind::NotFound => (
                    StatusCode::NOT_FOUND,
                    json!({
                        "error": "not_found",
                        "message": "document not found"
                    }),
                ),
                ErrorKind::Conflict => (
                    StatusCode::CONFLICT,
                    json!({
                        "error": "conflict",
                        "message": "a document with this id already exists"
                    }),
                ),
                ErrorKind::StoreFailure | ErrorKind::Configuration => {
                    // Log the actual error, return generic message
                    tracing::error!("Store error: {}", e);
                    internal_error()
                }
            },
            Self::Unauthorized { reason } => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": reason
                }),
            ),
            Self::Provider { message } => {
                tracing::warn!("OAuth provider error: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "oauth_error",
                        "message": "authentication with the provider failed"
                    }),
                )
            }
            Self::ProviderDisabled { provider } => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": "provider_disabled",
                    "message": format!("{} login is not configured", provider)
                }),
            ),
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                internal_error()
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Outbound provider calls fail as provider errors
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::provider(e.to_string())
    }
}

/// Startup and serving errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Missing { field: "code" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_kinds_map_to_statuses() {
        let cases = [
            (StoreError::not_found("resources", "x"), StatusCode::NOT_FOUND),
            (StoreError::conflict("resources", "x"), StatusCode::CONFLICT),
            (
                StoreError::failure("find", "connection refused"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::not_initialized("cfc_db"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn store_failure_does_not_leak_details() {
        let err = ApiError::from(StoreError::failure(
            "find",
            "mongodb://admin:secret@db:27017 unreachable",
        ));
        let body = body_of(err.into_response()).await;
        let text = body.to_string();
        assert!(!text.contains("mongodb://"));
        assert_eq!(body["message"], "an internal error occurred");
    }

    #[tokio::test]
    async fn not_found_does_not_echo_identifier() {
        let err = ApiError::from(StoreError::not_found("resources", "65a1f0c2b3d4e5f601234567"));
        let body = body_of(err.into_response()).await;
        assert!(!body.to_string().contains("65a1f0c2b3d4e5f601234567"));
    }

    #[tokio::test]
    async fn unauthorized_is_401() {
        let err = ApiError::Unauthorized { reason: "no session" };
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn disabled_provider_is_503() {
        let err = ApiError::ProviderDisabled { provider: "GitHub" };
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
