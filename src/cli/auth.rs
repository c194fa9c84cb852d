use std::path::Path;

use crate::{Res, config::Credentials, spotify};

/// Runs the authorization flow and caches the token, replacing any cached one.
pub async fn auth(conf: &Path, no_browser: bool) -> Res<()> {
    let credentials = Credentials::load(conf)?;
    spotify::auth::login(&credentials, no_browser).await?;
    Ok(())
}
