//! Health check route

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

pub const API_TITLE: &str = "Coders For Coders API";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseHealth,
    pub api_version: &'static str,
    pub api_title: &'static str,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// GET /api/health
///
/// 503 when the content database cannot be reached.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.content().database().to_string();

    let info = match state.registry().get_handle(&database).await {
        Ok(handle) => handle.server_info().await,
        Err(e) => Err(e),
    };

    let (status, health, database) = match info {
        Ok(info) => (
            StatusCode::OK,
            "healthy",
            DatabaseHealth {
                status: "connected",
                version: Some(info.version),
            },
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "unhealthy",
                DatabaseHealth {
                    status: "disconnected",
                    version: None,
                },
            )
        }
    };

    (
        status,
        Json(HealthResponse {
            status: health,
            database,
            api_version: env!("CARGO_PKG_VERSION"),
            api_title: API_TITLE,
            uptime_seconds: state.uptime().as_secs(),
        }),
    )
}
