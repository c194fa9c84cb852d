use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::{
    Res, config,
    error::Error,
    management::TokenManager,
    types::{
        AddItemsRequest, AudioFeatures, AudioFeaturesResponse, CurrentUser, Page, PlaylistItem,
        RemotePlaylist, RemoveItemsRequest, SnapshotResponse,
    },
};

use super::{TRACK_FIELDS, TrackSource, not_found, track_id_from_uri};

/// Web API client authenticated through a [`TokenManager`].
///
/// The token manager sits behind an async mutex so an expired token can be
/// refreshed from `&self` methods.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            api_url: config::spotify_apiurl(),
            tokens: Mutex::new(tokens),
        }
    }

    async fn authorized(&self, request: RequestBuilder) -> Res<RequestBuilder> {
        let token = self.tokens.lock().await.get_valid_token().await?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, stage: &str, request: RequestBuilder) -> Res<Response> {
        self.authorized(request)
            .await?
            .send()
            .await
            .map_err(|e| Error::remote(stage, e))
    }

    async fn decode<T: DeserializeOwned>(stage: &str, response: Response) -> Res<T> {
        let response = Self::check(stage, response).await?;
        response.json::<T>().await.map_err(|e| Error::remote(stage, e))
    }

    async fn check(stage: &str, response: Response) -> Res<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::remote(stage, format!("{} {}", status, body.trim())))
    }

    /// Uploads a JPEG as the playlist's custom cover.
    pub async fn upload_cover(&self, playlist_id: &str, jpeg: &[u8]) -> Res<()> {
        let stage = "upload cover image";
        let request = self
            .http
            .put(format!("{}/playlists/{}/images", self.api_url, playlist_id))
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(STANDARD.encode(jpeg));

        let response = self.send(stage, request).await?;
        Self::check(stage, response).await?;
        Ok(())
    }
}

#[async_trait]
impl TrackSource for SpotifyClient {
    async fn current_user(&self) -> Res<CurrentUser> {
        let stage = "fetch current user";
        let request = self.http.get(format!("{}/me", self.api_url));
        let response = self.send(stage, request).await?;
        Self::decode(stage, response).await
    }

    async fn user_playlists_page(&self, offset: u32, limit: u32) -> Res<Page<RemotePlaylist>> {
        let stage = "fetch user playlists";
        let request = self
            .http
            .get(format!("{}/me/playlists", self.api_url))
            .query(&[("offset", offset), ("limit", limit)]);
        let response = self.send(stage, request).await?;
        Self::decode(stage, response).await
    }

    async fn playlist(&self, playlist_id: &str) -> Res<RemotePlaylist> {
        let stage = "fetch playlist";
        let request = self
            .http
            .get(format!("{}/playlists/{}", self.api_url, playlist_id))
            .query(&[("fields", "id,name,owner(id,display_name),collaborative,snapshot_id")]);
        let response = self.send(stage, request).await?;

        // Spotify answers 400 for ids that are not valid base62.
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST
        ) {
            return Err(not_found(playlist_id));
        }
        Self::decode(stage, response).await
    }

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Res<Page<PlaylistItem>> {
        let stage = "fetch playlist tracks";
        let request = self
            .http
            .get(format!("{}/playlists/{}/tracks", self.api_url, playlist_id))
            .query(&[("fields", TRACK_FIELDS)])
            .query(&[("offset", offset), ("limit", limit)]);
        let response = self.send(stage, request).await?;
        Self::decode(stage, response).await
    }

    async fn audio_features(&self, uris: &[String]) -> Res<Vec<Option<AudioFeatures>>> {
        let stage = "fetch audio features";
        let ids: Vec<Option<&str>> = uris.iter().map(|uri| track_id_from_uri(uri)).collect();
        let known: Vec<&str> = ids.iter().flatten().copied().collect();
        if known.is_empty() {
            return Ok(vec![None; uris.len()]);
        }

        let request = self
            .http
            .get(format!("{}/audio-features", self.api_url))
            .query(&[("ids", known.join(","))]);
        let response = self.send(stage, request).await?;
        let body: AudioFeaturesResponse = Self::decode(stage, response).await?;

        if body.audio_features.len() != known.len() {
            return Err(Error::remote(
                stage,
                format!(
                    "expected {} entries, got {}",
                    known.len(),
                    body.audio_features.len()
                ),
            ));
        }

        let mut fetched = body.audio_features.into_iter();
        Ok(ids
            .iter()
            .map(|id| id.and_then(|_| fetched.next().flatten()))
            .collect())
    }

    async fn remove_all_occurrences(
        &self,
        playlist_id: &str,
        uris: &[String],
        snapshot_id: &str,
    ) -> Res<String> {
        let stage = "remove playlist items";
        let request = self
            .http
            .delete(format!("{}/playlists/{}/tracks", self.api_url, playlist_id))
            .json(&RemoveItemsRequest::new(uris, snapshot_id));
        let response = self.send(stage, request).await?;
        let body: SnapshotResponse = Self::decode(stage, response).await?;
        Ok(body.snapshot_id)
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Res<String> {
        let stage = "add playlist items";
        let request = self
            .http
            .post(format!("{}/playlists/{}/tracks", self.api_url, playlist_id))
            .json(&AddItemsRequest {
                uris: uris.to_vec(),
            });
        let response = self.send(stage, request).await?;
        let body: SnapshotResponse = Self::decode(stage, response).await?;
        Ok(body.snapshot_id)
    }
}
