//! Configuration management for spreorder.
//!
//! Two sources feed the application:
//! 1. The JSON file passed with `--conf` holding the Spotify application
//!    credentials (`"Client ID"`, `"Client secret"`, `"Redirect URI"`).
//! 2. Environment variables, optionally loaded from a `.env` file in the local
//!    data directory, overriding the Spotify endpoints. Every endpoint falls back
//!    to the public Spotify default.

use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use reqwest::Url;
use serde::Deserialize;

use crate::{Res, error::Error};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";

pub const DEFAULT_SCOPE: &str = "playlist-read-private playlist-modify-public playlist-modify-private playlist-read-collaborative ugc-image-upload";

/// Application credentials read from the `--conf` file.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "Client ID")]
    pub client_id: String,
    #[serde(rename = "Client secret", default)]
    pub client_secret: Option<String>,
    #[serde(rename = "Redirect URI", default = "default_redirect_uri")]
    pub redirect_uri: String,
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

impl Credentials {
    /// Reads and validates the credentials file.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigMissing`] when the file cannot be read, is not valid JSON,
    /// has an empty client id, or carries a redirect URI that is not a URL.
    pub fn load(path: &Path) -> Res<Self> {
        let missing = |reason: String| Error::ConfigMissing {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| missing(e.to_string()))?;
        let credentials: Credentials =
            serde_json::from_str(&content).map_err(|e| missing(e.to_string()))?;

        if credentials.client_id.trim().is_empty() {
            return Err(missing("\"Client ID\" is empty".to_string()));
        }
        credentials
            .callback_addr()
            .map_err(|e| missing(format!("\"Redirect URI\": {}", e)))?;

        Ok(credentials)
    }

    /// Local address the OAuth callback server must bind to, derived from the
    /// redirect URI.
    pub fn callback_addr(&self) -> Result<SocketAddr, String> {
        let url = Url::parse(&self.redirect_uri).map_err(|e| e.to_string())?;
        let host = match url.host_str() {
            Some("localhost") | None => "127.0.0.1",
            Some(host) => host,
        };
        let port = url.port_or_known_default().unwrap_or(80);
        format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|e| e.to_string())
    }

    /// Path component of the redirect URI, the route the callback server serves.
    pub fn callback_path(&self) -> String {
        Url::parse(&self.redirect_uri)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| "/".to_string())
    }
}

/// Platform data directory of the application, e.g. `~/.local/share/spreorder`.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spreorder");
    path
}

/// Loads environment overrides from `<data_dir>/.env`.
///
/// A missing file is not an error; a malformed one is reported.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    env_or("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

/// Returns the Spotify OAuth authorization URL (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> String {
    env_or(
        "SPOTIFY_API_AUTH_URL",
        "https://accounts.spotify.com/authorize",
    )
}

/// Returns the Spotify OAuth token exchange URL (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    env_or(
        "SPOTIFY_API_TOKEN_URL",
        "https://accounts.spotify.com/api/token",
    )
}

/// Returns the space separated scope list (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> String {
    env_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}
