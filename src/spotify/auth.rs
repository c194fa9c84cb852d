use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    Res, config,
    config::Credentials,
    error::Error,
    info,
    management::{TokenManager, token_from_json},
    server::start_api_server,
    success,
    types::{PkceState, Token},
    utils, warning,
};

/// How long the local callback server waits for Spotify's redirect.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Returns a token manager, reusing the cached token when one exists.
///
/// Without a cache the full authorization-code flow of [`login`] runs.
pub async fn authorize(credentials: &Credentials, no_browser: bool) -> Res<TokenManager> {
    match TokenManager::load(credentials.clone()).await {
        Ok(manager) => Ok(manager),
        Err(_) => login(credentials, no_browser).await,
    }
}

/// Runs the OAuth 2.0 authorization-code flow with PKCE and caches the token.
///
/// 1. Generates the PKCE verifier/challenge and a CSRF state value
/// 2. Either opens the browser and waits on the local callback server, or,
///    with `no_browser`, prints the URL and reads the redirected URL from stdin
/// 3. Exchanges the code (plus verifier, plus client secret when configured)
/// 4. Persists the token in the local cache
pub async fn login(credentials: &Credentials, no_browser: bool) -> Res<TokenManager> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let csrf_state = utils::generate_state();

    let auth_url = authorization_url(credentials, &code_challenge, &csrf_state)?;

    let code = if no_browser {
        read_redirect_from_stdin(&auth_url, &csrf_state).await?
    } else {
        wait_for_browser(credentials, &auth_url, csrf_state).await?
    };

    let token = exchange_code_pkce(credentials, &code, &code_verifier).await?;
    let manager = TokenManager::new(token, credentials.clone());
    manager.persist().await?;

    success!("Authentication successful!");
    Ok(manager)
}

/// Builds the Spotify authorization URL for the PKCE flow.
pub fn authorization_url(
    credentials: &Credentials,
    code_challenge: &str,
    csrf_state: &str,
) -> Res<String> {
    let url = Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", credentials.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge),
            ("state", csrf_state),
            ("scope", config::spotify_scope().as_str()),
        ],
    )
    .map_err(|e| Error::AuthFailure(format!("invalid authorization URL: {}", e)))?;

    Ok(url.to_string())
}

/// Extracts the authorization code from the URL Spotify redirected to.
pub fn parse_redirect(redirect: &str, expected_state: &str) -> Result<String, String> {
    let url = Url::parse(redirect.trim()).map_err(|e| format!("not a URL: {}", e))?;
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if let Some(error) = param("error") {
        return Err(format!("Spotify denied the authorization: {}", error));
    }
    if param("state").as_deref() != Some(expected_state) {
        return Err("state parameter does not match this login attempt".to_string());
    }
    param("code").ok_or_else(|| "no code parameter in URL".to_string())
}

async fn read_redirect_from_stdin(auth_url: &str, csrf_state: &str) -> Res<String> {
    info!("Open the following URL in a browser and authorize the application:");
    println!("{}", auth_url);
    info!("Then paste the URL you were redirected to:");

    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await
    .map_err(|e| Error::AuthFailure(e.to_string()))??;

    parse_redirect(&line, csrf_state).map_err(Error::AuthFailure)
}

async fn wait_for_browser(
    credentials: &Credentials,
    auth_url: &str,
    csrf_state: String,
) -> Res<String> {
    let addr = credentials.callback_addr().map_err(Error::AuthFailure)?;
    let shared_state = Arc::new(Mutex::new(PkceState {
        csrf_state,
        outcome: None,
    }));

    let server =
        start_api_server(addr, &credentials.callback_path(), Arc::clone(&shared_state)).await?;

    if webbrowser::open(auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let outcome = wait_for_code(shared_state).await;
    server.abort();

    match outcome {
        Some(Ok(code)) => Ok(code),
        Some(Err(reason)) => Err(Error::AuthFailure(reason)),
        None => Err(Error::AuthFailure(
            "timed out waiting for the authorization callback".to_string(),
        )),
    }
}

/// Polls the shared state until the callback route recorded an outcome.
async fn wait_for_code(shared_state: Arc<Mutex<PkceState>>) -> Option<Result<String, String>> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        if let Some(outcome) = shared_state.lock().await.outcome.clone() {
            return Some(outcome);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    None
}

/// Exchanges an authorization code for a token.
pub async fn exchange_code_pkce(
    credentials: &Credentials,
    code: &str,
    verifier: &str,
) -> Res<Token> {
    let client = Client::new();
    let mut request = client.post(config::spotify_apitoken_url()).form(&[
        ("grant_type", "authorization_code"),
        ("client_id", credentials.client_id.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", credentials.redirect_uri.as_str()),
    ]);
    if let Some(secret) = &credentials.client_secret {
        request = request.basic_auth(&credentials.client_id, Some(secret));
    }

    let res = request
        .send()
        .await
        .map_err(|e| Error::AuthFailure(e.to_string()))?;
    let json: Value = res
        .json()
        .await
        .map_err(|e| Error::AuthFailure(e.to_string()))?;

    token_from_json(&json)
}
