use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, sync::Arc};
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{Res, api, error::Error, types::PkceState, warning};

/// Binds the callback server and serves it on a background task.
///
/// The listener is bound before returning so the browser cannot race the
/// server. Callers abort the returned handle once the flow is over.
pub async fn start_api_server(
    addr: SocketAddr,
    callback_path: &str,
    state: Arc<Mutex<PkceState>>,
) -> Res<JoinHandle<()>> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route(callback_path, get(api::callback).layer(Extension(state)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::AuthFailure(format!("cannot listen on {}: {}", addr, e)))?;

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warning!("Callback server stopped: {}", e);
        }
    }))
}
