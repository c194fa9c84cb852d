mod common;

use common::{
    Call, MockSource, Op, PLAYLIST_ID, SNAPSHOT, USER_ID, numbered_tracks, remote_playlist, track,
};
use spreorder::error::Error;
use spreorder::pipeline::{
    commit, dedupe, duplicate_count, enrich_audio_features, fetch_playlist, list_user_playlists,
    prepare,
};
use spreorder::policy::{AudioFeature, Policy, SortOrder};
use spreorder::reorder::reorder;
use spreorder::types::{AudioFeatures, Playlist};

fn playlist_of(tracks: Vec<spreorder::types::Track>) -> Playlist {
    Playlist {
        id: PLAYLIST_ID.to_string(),
        name: "Test playlist".to_string(),
        owner_id: USER_ID.to_string(),
        collaborative: false,
        snapshot_id: SNAPSHOT.to_string(),
        tracks,
    }
}

fn chunk_sizes(calls: &[Call]) -> Vec<(&'static str, usize)> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Remove { uris, .. } => Some(("remove", uris.len())),
            Call::Add(uris) => Some(("add", uris.len())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_fetch_exhausts_pagination() {
    let source = MockSource::new(numbered_tracks(250));

    let playlist = fetch_playlist(&source, PLAYLIST_ID).await.unwrap();

    assert_eq!(playlist.tracks.len(), 250);
    assert_eq!(playlist.snapshot_id, SNAPSHOT);
    assert_eq!(playlist.owner_id, USER_ID);
    assert_eq!(playlist.tracks[249].uri, "spotify:track:t0249");

    let pages: Vec<Call> = source
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::TracksPage { .. }))
        .collect();
    assert_eq!(
        pages,
        vec![
            Call::TracksPage { offset: 0, limit: 100 },
            Call::TracksPage { offset: 100, limit: 100 },
            Call::TracksPage { offset: 200, limit: 100 },
        ]
    );
}

#[tokio::test]
async fn test_fetch_follows_the_page_size_of_the_server() {
    let mut source = MockSource::new(numbered_tracks(45));
    source.page_size = 20;

    let playlist = fetch_playlist(&source, PLAYLIST_ID).await.unwrap();

    assert_eq!(playlist.tracks.len(), 45);
    let offsets: Vec<u32> = source
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::TracksPage { offset, .. } => Some(*offset),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![0, 20, 40]);
}

#[tokio::test]
async fn test_fetch_skips_unavailable_items() {
    let source = MockSource::with_items(vec![
        Some(track("spotify:track:a", "a", 1)),
        None,
        Some(track("spotify:track:b", "b", 2)),
    ]);

    let playlist = fetch_playlist(&source, PLAYLIST_ID).await.unwrap();

    let uris: Vec<&str> = playlist.tracks.iter().map(|t| t.uri.as_str()).collect();
    assert_eq!(uris, vec!["spotify:track:a", "spotify:track:b"]);
}

#[tokio::test]
async fn test_fetch_unknown_playlist_is_not_found() {
    let source = MockSource::new(numbered_tracks(3));

    let err = fetch_playlist(&source, "doesnotexist").await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_fetch_empty_id_is_not_found_without_calls() {
    let source = MockSource::new(numbered_tracks(3));

    let err = fetch_playlist(&source, "   ").await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_names_the_page() {
    let mut source = MockSource::new(numbered_tracks(250));
    source.fail_on = Some((Op::TracksPage, 2));

    let err = fetch_playlist(&source, PLAYLIST_ID).await.unwrap_err();

    match err {
        Error::RemoteCallFailure { stage, .. } => {
            assert_eq!(stage, "fetch playlist tracks page 2")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_user_playlists_keep_owned_and_collaborative() {
    let mut source = MockSource::new(Vec::new());
    source.page_size = 2;
    source.user_playlists = vec![
        remote_playlist("p1", "Mine", USER_ID, false),
        remote_playlist("p2", "Followed", "someone", false),
        remote_playlist("p3", "Shared", "someone", true),
        remote_playlist("p4", "Also mine", USER_ID, false),
        remote_playlist("p5", "Other", "else", false),
    ];

    let playlists = list_user_playlists(&source).await.unwrap();

    let ids: Vec<&str> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p3", "p4"]);
}

#[tokio::test]
async fn test_no_visible_playlist_is_not_found() {
    let mut source = MockSource::new(Vec::new());
    source.user_playlists = vec![remote_playlist("p2", "Followed", "someone", false)];

    let err = list_user_playlists(&source).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_enrichment_batches_and_aligns_features() {
    let tracks = numbered_tracks(250);
    let mut source = MockSource::new(tracks.clone());
    for (i, t) in tracks.iter().enumerate() {
        // Leave every tenth track without data
        if i % 10 != 0 {
            source.features.insert(
                t.uri.clone(),
                AudioFeatures {
                    tempo: i as f64,
                    ..Default::default()
                },
            );
        }
    }

    let playlist = enrich_audio_features(&source, playlist_of(tracks))
        .await
        .unwrap();

    let batches: Vec<usize> = source
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::AudioFeatures(uris) => Some(uris.len()),
            _ => None,
        })
        .collect();
    assert_eq!(batches, vec![100, 100, 50]);

    for (i, t) in playlist.tracks.iter().enumerate() {
        match &t.audio_features {
            Some(features) => assert_eq!(features.tempo, i as f64),
            None => assert_eq!(i % 10, 0),
        }
    }
}

#[tokio::test]
async fn test_commit_250_tracks_in_three_interleaved_chunks() {
    let tracks = numbered_tracks(250);
    let source = MockSource::new(tracks.clone());
    let reordered = playlist_of(reorder(tracks, Policy::Popularity, SortOrder::Desc));

    let report = commit(&source, &reordered).await.unwrap();

    assert_eq!(report.chunks, 3);
    assert_eq!(report.tracks, 250);
    assert_eq!(
        chunk_sizes(&source.calls()),
        vec![
            ("remove", 100),
            ("add", 100),
            ("remove", 100),
            ("add", 100),
            ("remove", 50),
            ("add", 50),
        ]
    );
    assert_eq!(source.remote_uris(), reordered.uris());
}

#[tokio::test]
async fn test_commit_reuses_the_fetch_snapshot_for_every_removal() {
    let tracks = numbered_tracks(150);
    let source = MockSource::new(tracks.clone());

    commit(&source, &playlist_of(tracks)).await.unwrap();

    for call in source.calls() {
        if let Call::Remove { snapshot, .. } = call {
            assert_eq!(snapshot, SNAPSHOT);
        }
    }
}

#[tokio::test]
async fn test_commit_chunks_follow_final_order() {
    let tracks = numbered_tracks(120);
    let source = MockSource::new(tracks.clone());
    let mut reversed = tracks.clone();
    reversed.reverse();

    commit(&source, &playlist_of(reversed.clone())).await.unwrap();

    let first_add = source
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::Add(uris) => Some(uris),
            _ => None,
        })
        .unwrap();
    assert_eq!(first_add[0], "spotify:track:t0119");
    assert_eq!(source.remote_uris(), playlist_of(reversed).uris());
}

#[tokio::test]
async fn test_failed_second_append_is_a_partial_commit() {
    let tracks = numbered_tracks(250);
    let mut source = MockSource::new(tracks.clone());
    source.fail_on = Some((Op::Add, 2));

    let err = commit(&source, &playlist_of(tracks)).await.unwrap_err();

    assert!(err.to_string().contains("1 of 3 chunks committed."));
    match err {
        Error::PartialCommit {
            committed, total, ..
        } => {
            assert_eq!(committed, 1);
            assert_eq!(total, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // No further chunk is attempted after the failure
    assert_eq!(
        chunk_sizes(&source.calls()),
        vec![("remove", 100), ("add", 100), ("remove", 100), ("add", 100)]
    );
}

#[tokio::test]
async fn test_failed_first_append_reports_the_removed_tracks() {
    let tracks = numbered_tracks(250);
    let mut source = MockSource::new(tracks.clone());
    source.fail_on = Some((Op::Add, 1));

    let err = commit(&source, &playlist_of(tracks)).await.unwrap_err();

    // The first chunk is gone from the remote playlist
    assert_eq!(source.remote_uris().len(), 150);
    assert!(
        err.to_string()
            .contains("100 track(s) of this chunk were removed and not re-added")
    );
    match err {
        Error::PartialCommit {
            stage,
            committed,
            total,
            ..
        } => {
            assert_eq!(stage, "commit chunk 1/3 (append)");
            assert_eq!(committed, 0);
            assert_eq!(total, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        chunk_sizes(&source.calls()),
        vec![("remove", 100), ("add", 100)]
    );
}

#[tokio::test]
async fn test_failed_later_removal_is_a_partial_commit() {
    let tracks = numbered_tracks(250);
    let mut source = MockSource::new(tracks.clone());
    source.fail_on = Some((Op::Remove, 2));

    let err = commit(&source, &playlist_of(tracks)).await.unwrap_err();

    assert!(err.to_string().contains("1 of 3 chunks committed."));
    match err {
        Error::PartialCommit {
            stage,
            committed,
            total,
            ..
        } => {
            assert_eq!(stage, "commit chunk 2/3 (remove)");
            assert_eq!(committed, 1);
            assert_eq!(total, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        chunk_sizes(&source.calls()),
        vec![("remove", 100), ("add", 100), ("remove", 100)]
    );
}

#[tokio::test]
async fn test_failed_first_removal_is_a_remote_call_failure() {
    let tracks = numbered_tracks(10);
    let mut source = MockSource::new(tracks.clone());
    source.fail_on = Some((Op::Remove, 1));

    let err = commit(&source, &playlist_of(tracks)).await.unwrap_err();

    match err {
        Error::RemoteCallFailure { stage, .. } => assert_eq!(stage, "commit chunk 1/1 (remove)"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn test_commit_of_empty_playlist_makes_no_call() {
    let source = MockSource::new(Vec::new());

    let report = commit(&source, &playlist_of(Vec::new())).await.unwrap();

    assert_eq!(report.chunks, 0);
    assert_eq!(report.snapshot_id, None);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_prepare_fetches_features_only_for_feature_policies() {
    let tracks = vec![
        track("spotify:track:loud", "x", 0),
        track("spotify:track:quiet", "y", 0),
    ];
    let mut source = MockSource::new(tracks.clone());
    source.features.insert(
        "spotify:track:loud".to_string(),
        AudioFeatures {
            loudness: -3.0,
            ..Default::default()
        },
    );
    source.features.insert(
        "spotify:track:quiet".to_string(),
        AudioFeatures {
            loudness: -20.0,
            ..Default::default()
        },
    );

    let sorted = prepare(
        &source,
        playlist_of(tracks.clone()),
        Policy::AudioFeature(AudioFeature::Loudness),
        SortOrder::Asc,
    )
    .await
    .unwrap();
    assert_eq!(sorted.tracks[0].uri, "spotify:track:quiet");

    let calls_before = source.calls().len();
    prepare(&source, playlist_of(tracks), Policy::Alphabetical, SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(source.calls().len(), calls_before);
}

#[test]
fn test_duplicates_are_counted_and_dropped() {
    let a = track("spotify:track:a", "a", 0);
    let b = track("spotify:track:b", "b", 0);
    let playlist = playlist_of(vec![a.clone(), b.clone(), a.clone(), a.clone()]);

    assert_eq!(duplicate_count(&playlist), 2);

    let (deduped, dropped) = dedupe(playlist);
    assert_eq!(dropped, 2);
    assert_eq!(deduped.tracks, vec![a, b]);
}
