//! # Spotify Integration Module
//!
//! The remote boundary of spreorder. [`TrackSource`] lists the Web API calls the
//! pipeline needs; [`SpotifyClient`] implements them over `reqwest` with a cached
//! OAuth token, and tests substitute an in-memory recorder.
//!
//! ## API Coverage
//!
//! - `GET /me` - id of the authorized user
//! - `GET /me/playlists` - playlists visible to the user, offset paginated
//! - `GET /playlists/{id}` - playlist metadata and snapshot id
//! - `GET /playlists/{id}/tracks` - track listing with field selection
//! - `GET /audio-features` - up to 100 tracks per call
//! - `DELETE /playlists/{id}/tracks` - remove every occurrence of up to 100 URIs
//! - `POST /playlists/{id}/tracks` - append up to 100 URIs
//! - `PUT /playlists/{id}/images` - custom cover upload
//!
//! No call is retried. A failed request maps to [`Error::RemoteCallFailure`]
//! (or [`Error::NotFound`] for a 404 on playlist metadata) and aborts the run.

pub mod auth;
mod client;

use async_trait::async_trait;

pub use client::SpotifyClient;

use crate::{
    Res,
    error::Error,
    types::{AudioFeatures, CurrentUser, Page, PlaylistItem, RemotePlaylist},
};

/// Maximum page size of the playlist listings.
pub const PAGE_LIMIT: u32 = 100;

/// Maximum number of ids or URIs accepted by one batch call.
pub const BATCH_LIMIT: usize = 100;

/// Field selection for the playlist track listing.
pub const TRACK_FIELDS: &str = "next,offset,limit,total,items.track(uri,type,popularity,name)";

#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn current_user(&self) -> Res<CurrentUser>;

    async fn user_playlists_page(&self, offset: u32, limit: u32) -> Res<Page<RemotePlaylist>>;

    /// Metadata of one playlist. Unknown ids yield [`Error::NotFound`].
    async fn playlist(&self, playlist_id: &str) -> Res<RemotePlaylist>;

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Res<Page<PlaylistItem>>;

    /// Audio features aligned with `uris`; `None` where Spotify has no data.
    async fn audio_features(&self, uris: &[String]) -> Res<Vec<Option<AudioFeatures>>>;

    /// Removes every occurrence of each URI and returns the new snapshot id.
    async fn remove_all_occurrences(
        &self,
        playlist_id: &str,
        uris: &[String],
        snapshot_id: &str,
    ) -> Res<String>;

    /// Appends `uris` in order and returns the new snapshot id.
    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Res<String>;
}

/// Extracts the base62 id from a `spotify:track:<id>` URI.
///
/// Local files and episodes have no audio features and return `None`.
pub fn track_id_from_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix("spotify:track:")
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub(crate) fn not_found(playlist_id: &str) -> Error {
    Error::NotFound(format!("no playlist with id '{}'", playlist_id))
}
