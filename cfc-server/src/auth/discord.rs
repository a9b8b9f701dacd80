//! Discord OAuth app: authorize URL, code exchange, profile

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;

use super::accounts::{ProviderId, ProviderIdentity};
use super::TokenResponse;
use crate::config::ProviderConfig;
use crate::error::ApiError;

const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
const TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const USER_URL: &str = "https://discord.com/api/users/@me";
const AVATAR_BASE: &str = "https://cdn.discordapp.com/avatars";
const SCOPE: &str = "identify email";

#[derive(Debug, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

pub fn authorize_url(config: &ProviderConfig, state: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
        AUTHORIZE_URL,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.callback_url),
        urlencoding::encode(SCOPE),
        urlencoding::encode(state),
    )
}

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
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.callback_url.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    response.into_access_token()
}

pub async fn fetch_identity(client: &Client, token: &str) -> Result<ProviderIdentity, ApiError> {
    let user: DiscordUser = client
        .get(USER_URL)
        .bearer_auth(token)
        .header(ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(identity_from_profile(user))
}

/// Avatar hashes become CDN URLs
pub fn identity_from_profile(user: DiscordUser) -> ProviderIdentity {
    let avatar = user
        .avatar
        .map(|hash| format!("{}/{}/{}.png", AVATAR_BASE, user.id, hash));

    ProviderIdentity {
        provider_id: ProviderId::Discord(user.id),
        username: user.username,
        email: user.email,
        avatar,
    }
}
