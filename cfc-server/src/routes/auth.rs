//! OAuth login routes
//!
//! Login redirects to the provider and sets a short-lived `oauth_state`
//! cookie. The callback checks the returned state against that cookie, trades
//! the code for a token, upserts the user, records a session and sets the
//! `session` cookie.

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::cookies::{clear_cookie, read_cookie, set_cookie, SESSION_COOKIE, STATE_COOKIE};
use crate::auth::tokens::{SESSION_TTL_SECS, STATE_TTL_SECS};
use crate::auth::{discord, github, ProviderIdentity};
use crate::config::ProviderConfig;
use crate::error::ApiError;
use crate::extractors::Authenticated;
use crate::models::{User, UserSummary, ValidationError};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    Github,
    Discord,
}

impl Provider {
    fn name(self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Discord => "Discord",
        }
    }

    fn config(self, state: &AppState) -> Result<&ProviderConfig, ApiError> {
        let config = match self {
            Self::Github => state.auth().github.as_ref(),
            Self::Discord => state.auth().discord.as_ref(),
        };
        config.ok_or(ApiError::ProviderDisabled {
            provider: self.name(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/github/login", get(github_login))
        .route("/api/auth/github/callback", get(github_callback))
        .route("/api/auth/github/org/join", post(join_org))
        .route("/api/auth/discord/login", get(discord_login))
        .route("/api/auth/discord/callback", get(discord_callback))
        .route("/api/auth/me", get(me))
}

/// GET /api/auth/github/login
async fn github_login(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    login(&state, Provider::Github)
}

/// GET /api/auth/discord/login
async fn discord_login(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    login(&state, Provider::Discord)
}

fn login(state: &AppState, provider: Provider) -> Result<impl IntoResponse, ApiError> {
    let config = provider.config(state)?;

    let token = state
        .tokens()
        .issue_state(Utc::now())
        .map_err(|e| ApiError::internal(format!("failed to sign state token: {}", e)))?;

    let url = match provider {
        Provider::Github => github::authorize_url(config, &token),
        Provider::Discord => discord::authorize_url(config, &token),
    };

    Ok((
        AppendHeaders([(SET_COOKIE, set_cookie(STATE_COOKIE, &token, STATE_TTL_SECS))]),
        Redirect::temporary(&url),
    ))
}

/// GET /api/auth/github/callback
async fn github_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    callback(&state, Provider::Github, params, &headers).await
}

/// GET /api/auth/discord/callback
async fn discord_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    callback(&state, Provider::Discord, params, &headers).await
}

async fn callback(
    state: &AppState,
    provider: Provider,
    params: CallbackParams,
    headers: &HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let config = provider.config(state)?;

    let code = params.code.ok_or(ValidationError::Missing { field: "code" })?;
    let returned = params.state.ok_or(ValidationError::Missing { field: "state" })?;

    let cookie = read_cookie(headers, STATE_COOKIE);
    if !state.tokens().verify_state(&returned, cookie.as_deref()) {
        tracing::warn!(provider = provider.name(), "OAuth state mismatch");
        return Err(ValidationError::InvalidFormat {
            field: "state",
            reason: "does not match the login request",
        }
        .into());
    }

    let client = state.http();
    let (access_token, identity): (String, ProviderIdentity) = match provider {
        Provider::Github => {
            let token = github::exchange_code(client, config, &code).await?;
            let identity = github::fetch_identity(client, &token).await?;
            (token, identity)
        }
        Provider::Discord => {
            let token = discord::exchange_code(client, config, &code).await?;
            let identity = discord::fetch_identity(client, &token).await?;
            (token, identity)
        }
    };

    let now = Utc::now();
    let user = state.accounts().upsert_user(identity, now).await?;
    state
        .accounts()
        .create_session(&user.id, &access_token, now)
        .await?;

    let session_token = state
        .tokens()
        .issue_session(&user.id, now)
        .map_err(|e| ApiError::internal(format!("failed to sign session token: {}", e)))?;

    tracing::info!(provider = provider.name(), user_id = %user.id, "login succeeded");

    Ok((
        AppendHeaders([
            (SET_COOKIE, set_cookie(SESSION_COOKIE, &session_token, SESSION_TTL_SECS)),
            (SET_COOKIE, clear_cookie(STATE_COOKIE)),
        ]),
        Json(json!({
            "status": "success",
            "user": UserSummary::from(&user),
        })),
    ))
}

/// GET /api/auth/me
async fn me(auth: Authenticated) -> Json<User> {
    Json(auth.user)
}

/// POST /api/auth/github/org/join
async fn join_org(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<Value>, ApiError> {
    Provider::Github.config(&state)?;

    if auth.user.github_id.is_none() {
        return Err(ApiError::provider("session was not created by a GitHub login"));
    }

    let org = &state.auth().github_org;
    github::invite_to_org(state.http(), &auth.session.access_token, org).await?;

    Ok(Json(json!({
        "message": format!("Invitation sent to join {}", org)
    })))
}
