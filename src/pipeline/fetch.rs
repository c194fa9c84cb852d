use crate::{
    Res,
    error::Error,
    spotify::{PAGE_LIMIT, TrackSource},
    types::{Playlist, RemotePlaylist},
    utils, warning,
};

/// `/me/playlists` accepts at most 50 items per page.
const USER_PLAYLISTS_LIMIT: u32 = 50;

/// Fetches a playlist and every one of its tracks, whatever the page size.
///
/// Items without a track object (removed or unavailable content) are skipped
/// with a warning, so the returned list never holds empty entries.
///
/// # Errors
///
/// - [`Error::NotFound`] for an empty or unknown playlist id
/// - [`Error::RemoteCallFailure`] naming the page that failed
pub async fn fetch_playlist<S>(source: &S, playlist_id: &str) -> Res<Playlist>
where
    S: TrackSource + ?Sized,
{
    let playlist_id = playlist_id.trim();
    if playlist_id.is_empty() {
        return Err(Error::NotFound("empty playlist id".to_string()));
    }

    let meta = source.playlist(playlist_id).await?;

    let pb = utils::spinner("Fetching the playlist tracks...");
    let mut tracks = Vec::new();
    let mut skipped = 0usize;
    let mut offset = 0u32;
    let mut page_number = 1usize;

    loop {
        let page = match source
            .playlist_tracks_page(&meta.id, offset, PAGE_LIMIT)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e.at_stage(format!("fetch playlist tracks page {}", page_number)));
            }
        };

        for item in page.items {
            match item.track {
                Some(track) => tracks.push(track),
                None => skipped += 1,
            }
        }

        match page.total {
            Some(total) => pb.set_message(format!("Fetched {}/{} tracks...", tracks.len(), total)),
            None => pb.set_message(format!("Fetched {} tracks...", tracks.len())),
        }

        if page.next.is_none() || page.limit == 0 {
            break;
        }
        offset = page.offset + page.limit;
        page_number += 1;
    }

    pb.finish_and_clear();

    if skipped > 0 {
        warning!(
            "Skipped {} unavailable item(s) of playlist {}",
            skipped,
            meta.name
        );
    }

    Ok(Playlist {
        id: meta.id,
        name: meta.name,
        owner_id: meta.owner.id,
        collaborative: meta.collaborative,
        snapshot_id: meta.snapshot_id,
        tracks,
    })
}

/// Lists every playlist the current user may reorder: the ones they own plus
/// collaborative ones.
///
/// # Errors
///
/// [`Error::NotFound`] when no such playlist is visible to the account.
pub async fn list_user_playlists<S>(source: &S) -> Res<Vec<RemotePlaylist>>
where
    S: TrackSource + ?Sized,
{
    let me = source.current_user().await?;

    let pb = utils::spinner("Fetching your playlists...");
    let mut playlists = Vec::new();
    let mut offset = 0u32;

    loop {
        let page = match source.user_playlists_page(offset, USER_PLAYLISTS_LIMIT).await {
            Ok(page) => page,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };

        playlists.extend(page.items);
        pb.set_message(format!("Fetched {} playlists...", playlists.len()));

        if page.next.is_none() || page.limit == 0 {
            break;
        }
        offset = page.offset + page.limit;
    }

    pb.finish_and_clear();

    playlists.retain(|p| p.owner.id == me.id || p.collaborative);
    if playlists.is_empty() {
        return Err(Error::NotFound(
            "no playlist owned by you or collaborative is visible to this account".to_string(),
        ));
    }

    Ok(playlists)
}
