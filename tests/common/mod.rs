#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use spreorder::{
    Res,
    error::Error,
    spotify::TrackSource,
    types::{AudioFeatures, CurrentUser, Owner, Page, PlaylistItem, RemotePlaylist, Track},
};

pub const PLAYLIST_ID: &str = "37i9dQZF1DXcBWIGoYBM5M";
pub const SNAPSHOT: &str = "snapshot-0";
pub const USER_ID: &str = "me";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CurrentUser,
    UserPlaylists { offset: u32, limit: u32 },
    Playlist(String),
    TracksPage { offset: u32, limit: u32 },
    AudioFeatures(Vec<String>),
    Remove { uris: Vec<String>, snapshot: String },
    Add(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Remove,
    Add,
    TracksPage,
    AudioFeatures,
}

/// In-memory stand-in for the Spotify API.
///
/// Keeps the remote URI list so removals and appends can be checked against
/// the final order.
pub struct MockSource {
    pub items: Vec<Option<Track>>,
    pub page_size: u32,
    pub features: HashMap<String, AudioFeatures>,
    pub user_playlists: Vec<RemotePlaylist>,
    /// Fail the nth (1-based) call of this operation.
    pub fail_on: Option<(Op, usize)>,
    calls: Mutex<Vec<Call>>,
    remote: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self::with_items(tracks.into_iter().map(Some).collect())
    }

    pub fn with_items(items: Vec<Option<Track>>) -> Self {
        let remote = items.iter().flatten().map(|t| t.uri.clone()).collect();
        Self {
            items,
            page_size: 100,
            features: HashMap::new(),
            user_playlists: Vec::new(),
            fail_on: None,
            calls: Mutex::new(Vec::new()),
            remote: Mutex::new(remote),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remote_uris(&self) -> Vec<String> {
        self.remote.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, op: Op) -> Res<()> {
        let Some((fail_op, nth)) = self.fail_on else {
            return Ok(());
        };
        if fail_op != op {
            return Ok(());
        }

        let count = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                matches!(
                    (op, c),
                    (Op::Remove, Call::Remove { .. })
                        | (Op::Add, Call::Add(_))
                        | (Op::TracksPage, Call::TracksPage { .. })
                        | (Op::AudioFeatures, Call::AudioFeatures(_))
                )
            })
            .count();

        if count == nth {
            return Err(Error::remote("mock", "502 Bad Gateway"));
        }
        Ok(())
    }

    fn page<T: Clone>(&self, all: &[T], offset: u32, limit: u32) -> Page<T> {
        let limit = limit.min(self.page_size);
        let start = (offset as usize).min(all.len());
        let end = (start + limit as usize).min(all.len());
        Page {
            items: all[start..end].to_vec(),
            limit,
            offset,
            next: (end < all.len()).then(|| format!("next?offset={}", end)),
            total: Some(all.len() as u32),
        }
    }
}

pub fn track(uri: &str, name: &str, popularity: u32) -> Track {
    Track {
        uri: uri.to_string(),
        name: name.to_string(),
        popularity,
        audio_features: None,
    }
}

/// `count` tracks with URIs `spotify:track:t0000`, `spotify:track:t0001`, ...
pub fn numbered_tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| track(&format!("spotify:track:t{:04}", i), &format!("Song {:04}", i), (i % 100) as u32))
        .collect()
}

pub fn remote_playlist(id: &str, name: &str, owner: &str, collaborative: bool) -> RemotePlaylist {
    RemotePlaylist {
        id: id.to_string(),
        name: name.to_string(),
        owner: Owner {
            id: owner.to_string(),
            display_name: None,
        },
        collaborative,
        snapshot_id: SNAPSHOT.to_string(),
    }
}

#[async_trait]
impl TrackSource for MockSource {
    async fn current_user(&self) -> Res<CurrentUser> {
        self.record(Call::CurrentUser);
        Ok(CurrentUser {
            id: USER_ID.to_string(),
            display_name: None,
        })
    }

    async fn user_playlists_page(&self, offset: u32, limit: u32) -> Res<Page<RemotePlaylist>> {
        self.record(Call::UserPlaylists { offset, limit });
        Ok(self.page(&self.user_playlists, offset, limit))
    }

    async fn playlist(&self, playlist_id: &str) -> Res<RemotePlaylist> {
        self.record(Call::Playlist(playlist_id.to_string()));
        if playlist_id != PLAYLIST_ID {
            return Err(Error::NotFound(format!("no playlist with id '{}'", playlist_id)));
        }
        Ok(remote_playlist(PLAYLIST_ID, "Test playlist", USER_ID, false))
    }

    async fn playlist_tracks_page(
        &self,
        _playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Res<Page<PlaylistItem>> {
        self.record(Call::TracksPage { offset, limit });
        self.check_failure(Op::TracksPage)?;
        let items: Vec<PlaylistItem> = self
            .items
            .iter()
            .map(|t| PlaylistItem { track: t.clone() })
            .collect();
        Ok(self.page(&items, offset, limit))
    }

    async fn audio_features(&self, uris: &[String]) -> Res<Vec<Option<AudioFeatures>>> {
        self.record(Call::AudioFeatures(uris.to_vec()));
        self.check_failure(Op::AudioFeatures)?;
        Ok(uris.iter().map(|u| self.features.get(u).cloned()).collect())
    }

    async fn remove_all_occurrences(
        &self,
        _playlist_id: &str,
        uris: &[String],
        snapshot_id: &str,
    ) -> Res<String> {
        self.record(Call::Remove {
            uris: uris.to_vec(),
            snapshot: snapshot_id.to_string(),
        });
        self.check_failure(Op::Remove)?;
        self.remote.lock().unwrap().retain(|u| !uris.contains(u));
        Ok(format!("snapshot-remove-{}", uris.len()))
    }

    async fn add_items(&self, _playlist_id: &str, uris: &[String]) -> Res<String> {
        self.record(Call::Add(uris.to_vec()));
        self.check_failure(Op::Add)?;
        self.remote.lock().unwrap().extend(uris.iter().cloned());
        Ok(format!("snapshot-add-{}", self.remote.lock().unwrap().len()))
    }
}
