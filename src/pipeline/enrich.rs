use crate::{
    Res,
    error::Error,
    spotify::{BATCH_LIMIT, TrackSource},
    types::Playlist,
    utils,
};

/// Attaches audio features to every track, in batches of [`BATCH_LIMIT`].
///
/// Batches run one after another in track order. A track Spotify has no data
/// for keeps `audio_features == None`.
pub async fn enrich_audio_features<S>(source: &S, mut playlist: Playlist) -> Res<Playlist>
where
    S: TrackSource + ?Sized,
{
    let total = playlist.tracks.len().div_ceil(BATCH_LIMIT);
    let pb = utils::spinner("Getting audio features from Spotify...");

    for (index, batch) in playlist.tracks.chunks_mut(BATCH_LIMIT).enumerate() {
        let stage = format!("fetch audio features batch {}/{}", index + 1, total);
        pb.set_message(format!("Getting audio features {}/{}...", index + 1, total));

        let uris: Vec<String> = batch.iter().map(|t| t.uri.clone()).collect();
        let features = match source.audio_features(&uris).await {
            Ok(features) => features,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e.at_stage(stage));
            }
        };

        if features.len() != batch.len() {
            pb.finish_and_clear();
            return Err(Error::remote(
                stage,
                format!("expected {} entries, got {}", batch.len(), features.len()),
            ));
        }

        for (track, features) in batch.iter_mut().zip(features) {
            track.audio_features = features;
        }
    }

    pb.finish_and_clear();
    Ok(playlist)
}
