//! # Reorder Pipeline
//!
//! The core of spreorder, free of any terminal interaction:
//!
//! ```text
//! fetch (paginate) -> [enrich (batches of 100)] -> reorder (local) -> commit (chunks of 100)
//! ```
//!
//! Each stage takes the [`Playlist`](crate::types::Playlist) by value (or by
//! reference for the final commit) and hands it to the next, so no stage keeps
//! a long-lived mutable reference to it. Every network call is awaited before
//! the next one is issued.

mod commit;
mod enrich;
mod fetch;

pub use commit::{CommitReport, commit, dedupe, duplicate_count};
pub use enrich::enrich_audio_features;
pub use fetch::{fetch_playlist, list_user_playlists};

use crate::{
    Res,
    policy::{Policy, SortOrder},
    reorder,
    spotify::TrackSource,
    types::Playlist,
};

/// Enriches the playlist when the policy needs audio features, then reorders it.
pub async fn prepare<S>(source: &S, playlist: Playlist, policy: Policy, order: SortOrder) -> Res<Playlist>
where
    S: TrackSource + ?Sized,
{
    let mut playlist = if policy.needs_audio_features() {
        enrich_audio_features(source, playlist).await?
    } else {
        playlist
    };

    playlist.tracks = reorder::reorder(playlist.tracks, policy, order);
    Ok(playlist)
}
