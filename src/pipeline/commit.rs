use std::collections::HashSet;

use crate::{
    Res,
    error::Error,
    spotify::{BATCH_LIMIT, TrackSource},
    types::Playlist,
    utils,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub chunks: usize,
    pub tracks: usize,
    /// Snapshot id returned by the last append, `None` for an empty playlist.
    pub snapshot_id: Option<String>,
}

/// Writes the local order of `playlist` back to Spotify.
///
/// For each chunk of at most [`BATCH_LIMIT`] URIs, in final order, every
/// occurrence of the chunk's URIs is removed and the chunk is appended at the
/// end. The chunk's append completes before the next chunk's removal starts.
/// All removals carry the snapshot id captured at fetch time.
///
/// Nothing is retried or rolled back.
///
/// # Errors
///
/// - [`Error::RemoteCallFailure`] when the removal of the first chunk fails,
///   leaving the remote playlist untouched
/// - [`Error::PartialCommit`] for any other failure; it carries how many
///   chunks were fully committed and, for a failed append, how many tracks
///   were removed without being re-added
pub async fn commit<S>(source: &S, playlist: &Playlist) -> Res<CommitReport>
where
    S: TrackSource + ?Sized,
{
    let uris = playlist.uris();
    let total = uris.len().div_ceil(BATCH_LIMIT);
    let pb = utils::spinner("Updating the playlist...");
    let mut snapshot_id = None;

    for (index, chunk) in uris.chunks(BATCH_LIMIT).enumerate() {
        pb.set_message(format!(
            "Updating the playlist {}/{} (chunk {}/{})",
            index * BATCH_LIMIT + 1,
            uris.len(),
            index + 1,
            total
        ));

        if let Err(e) = source
            .remove_all_occurrences(&playlist.id, chunk, &playlist.snapshot_id)
            .await
        {
            pb.finish_and_clear();
            return Err(chunk_failure(e, index, total, None));
        }

        match source.add_items(&playlist.id, chunk).await {
            Ok(snapshot) => snapshot_id = Some(snapshot),
            Err(e) => {
                pb.finish_and_clear();
                return Err(chunk_failure(e, index, total, Some(chunk.len())));
            }
        }
    }

    pb.finish_and_clear();
    Ok(CommitReport {
        chunks: total,
        tracks: uris.len(),
        snapshot_id,
    })
}

/// Maps the failure of chunk `committed` (0-based) to the reported error.
///
/// `removed` is set when the append failed, with the size of the chunk whose
/// URIs are now gone from the remote playlist.
fn chunk_failure(err: Error, committed: usize, total: usize, removed: Option<usize>) -> Error {
    let step = if removed.is_some() { "append" } else { "remove" };
    let stage = format!("commit chunk {}/{} ({})", committed + 1, total, step);
    let reason = match err {
        Error::RemoteCallFailure { reason, .. } => reason,
        other if committed == 0 && removed.is_none() => return other,
        other => other.to_string(),
    };

    match removed {
        Some(count) => Error::PartialCommit {
            stage,
            committed,
            total,
            reason: format!(
                "{} track(s) of this chunk were removed and not re-added: {}",
                count, reason
            ),
        },
        None if committed > 0 => Error::PartialCommit {
            stage,
            committed,
            total,
            reason,
        },
        None => Error::RemoteCallFailure { stage, reason },
    }
}

/// Number of entries that repeat a URI seen earlier in the list.
///
/// Any non-zero value means the commit cannot preserve the exact multiset:
/// removals are playlist wide while appends restore one copy per occurrence
/// in the current chunk.
pub fn duplicate_count(playlist: &Playlist) -> usize {
    let mut seen = HashSet::new();
    playlist
        .tracks
        .iter()
        .filter(|t| !seen.insert(t.uri.as_str()))
        .count()
}

/// Keeps the first occurrence of every URI and returns how many entries were dropped.
pub fn dedupe(mut playlist: Playlist) -> (Playlist, usize) {
    let before = playlist.tracks.len();
    let mut seen = HashSet::new();
    playlist.tracks.retain(|t| seen.insert(t.uri.clone()));
    let dropped = before - playlist.tracks.len();
    (playlist, dropped)
}
