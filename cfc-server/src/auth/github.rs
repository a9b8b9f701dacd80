//! GitHub OAuth app: authorize URL, code exchange, profile, org invitations

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::accounts::{ProviderId, ProviderIdentity};
use super::TokenResponse;
use crate::config::ProviderConfig;
use crate::error::ApiError;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const EMAILS_URL: &str = "https://api.github.com/user/emails";
const API_BASE: &str = "https://api.github.com";
const SCOPE: &str = "read:user,user:email,read:org";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
pub struct GithubUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
}

pub fn authorize_url(config: &ProviderConfig, state: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&state={}&scope={}",
        AUTHORIZE_URL,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.callback_url),
        urlencoding::encode(state),
        urlencoding::encode(SCOPE),
    )
}

/// Trade the callback code for an access token
pub async fn exchange_code(
    client: &Client,
    config: &ProviderConfig,
    code: &str,
) -> Result<String, ApiError> {
    let response: TokenResponse = client
        .post(TOKEN_URL)
        .header(ACCEPT, "application/json")
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    response.into_access_token()
}

/// Profile and primary email of the token's owner
pub async fn fetch_identity(client: &Client, token: &str) -> Result<ProviderIdentity, ApiError> {
    let user = fetch_user(client, token).await?;

    let emails: Vec<GithubEmail> = client
        .get(EMAILS_URL)
        .bearer_auth(token)
        .header(ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(identity_from_profile(user, &emails))
}

async fn fetch_user(client: &Client, token: &str) -> Result<GithubUser, ApiError> {
    Ok(client
        .get(USER_URL)
        .bearer_auth(token)
        .header(ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

pub fn identity_from_profile(user: GithubUser, emails: &[GithubEmail]) -> ProviderIdentity {
    let email = emails
        .iter()
        .find(|e| e.primary)
        .map(|e| e.email.clone());

    ProviderIdentity {
        provider_id: ProviderId::Github(user.id),
        username: user.login,
        email,
        avatar: user.avatar_url,
    }
}

/// Invite the token's owner to `org` as a direct member
pub async fn invite_to_org(client: &Client, token: &str, org: &str) -> Result<(), ApiError> {
    let user = fetch_user(client, token).await?;

    client
        .post(format!("{}/orgs/{}/invitations", API_BASE, urlencoding::encode(org)))
        .bearer_auth(token)
        .header(ACCEPT, "application/vnd.github+json")
        .header("X-GitHub-Api-Version", API_VERSION)
        .json(&json!({
            "invitee_id": user.id,
            "role": "direct_member"
        }))
        .send()
        .await?
        .error_for_status()?;

    tracing::info!(login = %user.login, org, "sent organization invitation");
    Ok(())
}
