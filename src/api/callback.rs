use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::types::PkceState;

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<PkceState>>>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;

    if state.outcome.is_some() {
        return Html("<h4>This login attempt is already complete.</h4>");
    }

    if params.get("state") != Some(&state.csrf_state) {
        return Html("<h4>State mismatch, ignoring this request.</h4>");
    }

    if let Some(error) = params.get("error") {
        state.outcome = Some(Err(format!("Spotify denied the authorization: {}", error)));
        return Html("<h4>Login failed.</h4>");
    }

    match params.get("code") {
        Some(code) => {
            state.outcome = Some(Ok(code.clone()));
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        None => Html("<h4>Missing authorization code.</h4>"),
    }
}
