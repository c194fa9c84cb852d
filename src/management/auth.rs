use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::{
    Res, config,
    config::Credentials,
    error::Error,
    types::Token,
};

/// Seconds before the real expiry at which a token is already considered stale.
const EXPIRY_MARGIN: u64 = 240;

pub struct TokenManager {
    token: Token,
    credentials: Credentials,
}

impl TokenManager {
    pub fn new(token: Token, credentials: Credentials) -> Self {
        TokenManager { token, credentials }
    }

    pub async fn load(credentials: Credentials) -> Res<Self> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path).await?;
        let token: Token = serde_json::from_str(&content)
            .map_err(|e| Error::AuthFailure(format!("corrupt token cache: {}", e)))?;
        Ok(Self { token, credentials })
    }

    pub async fn persist(&self) -> Res<()> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)
            .map_err(|e| Error::AuthFailure(e.to_string()))?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    /// Returns an access token, refreshing and re-caching it first when stale.
    pub async fn get_valid_token(&mut self) -> Res<String> {
        if self.is_expired() {
            self.token = self.refresh_token().await?;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN >= self.token.obtained_at + self.token.expires_in
    }

    async fn refresh_token(&self) -> Res<Token> {
        let client = Client::new();
        let mut request = client.post(config::spotify_apitoken_url()).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", self.token.refresh_token.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
        ]);
        if let Some(secret) = &self.credentials.client_secret {
            request = request.basic_auth(&self.credentials.client_id, Some(secret));
        }

        let res = request
            .send()
            .await
            .map_err(|e| Error::AuthFailure(e.to_string()))?;
        if !res.status().is_success() {
            return Err(Error::AuthFailure(format!(
                "token refresh rejected with {}",
                res.status()
            )));
        }

        let json: Value = res
            .json()
            .await
            .map_err(|e| Error::AuthFailure(e.to_string()))?;

        // Spotify may omit the refresh token when it does not rotate it.
        let mut token = token_from_json(&json)?;
        if token.refresh_token.is_empty() {
            token.refresh_token = self.token.refresh_token.clone();
        }
        Ok(token)
    }

    fn token_path() -> PathBuf {
        let mut path = config::data_dir();
        path.push("cache/token.json");
        path
    }
}

/// Builds a [`Token`] from a token endpoint response.
pub fn token_from_json(json: &Value) -> Res<Token> {
    let access_token = json["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            let reason = json["error_description"]
                .as_str()
                .or_else(|| json["error"].as_str())
                .unwrap_or("no access token in response");
            Error::AuthFailure(reason.to_string())
        })?;

    Ok(Token {
        access_token: access_token.to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
        obtained_at: Utc::now().timestamp() as u64,
    })
}
