use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// State shared between the authorization flow and the local callback route.
#[derive(Debug, Clone)]
pub struct PkceState {
    pub csrf_state: String,
    /// `Ok(code)` once Spotify redirected back, `Err(reason)` if it reported an error.
    pub outcome: Option<Result<String, String>>,
}

/// One page of a Spotify offset-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: u32,
    pub offset: u32,
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Playlist metadata as returned by `/playlists/{id}` and `/me/playlists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePlaylist {
    pub id: String,
    pub name: String,
    pub owner: Owner,
    #[serde(default)]
    pub collaborative: bool,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Numeric audio descriptors of a track. Integer fields (`key`, `mode`, ...)
/// are kept as `f64` so every feature sorts through the same key type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AudioFeatures {
    pub acousticness: f64,
    pub danceability: f64,
    pub duration_ms: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub key: f64,
    pub liveness: f64,
    pub loudness: f64,
    pub mode: f64,
    pub speechiness: f64,
    pub tempo: f64,
    pub time_signature: f64,
    pub valence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(skip)]
    pub audio_features: Option<AudioFeatures>,
}

/// Entry of a playlist track listing. `track` is null for unavailable items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

/// A playlist with its full, ordered track list.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub collaborative: bool,
    pub snapshot_id: String,
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn uris(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.uri.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UriRef {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveItemsRequest {
    pub tracks: Vec<UriRef>,
    pub snapshot_id: String,
}

impl RemoveItemsRequest {
    pub fn new(uris: &[String], snapshot_id: &str) -> Self {
        Self {
            tracks: uris.iter().map(|uri| UriRef { uri: uri.clone() }).collect(),
            snapshot_id: snapshot_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemsRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub name: String,
    pub owner: String,
}
