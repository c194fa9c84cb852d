use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use tabled::Table;

use crate::{
    Res,
    cli::{Prompter, schedule::offer_schedule},
    config::Credentials,
    cover, info, pipeline,
    policy::{Policy, SortOrder},
    spotify::{self, SpotifyClient, TrackSource},
    success,
    types::{Playlist, PlaylistTableRow},
    warning,
};

#[derive(Debug, Clone)]
pub struct ReorderOptions {
    pub conf: PathBuf,
    pub playlist: Option<String>,
    pub policy: Option<Policy>,
    pub order: SortOrder,
    pub interactive: bool,
    pub image: bool,
    pub upload_image: bool,
    pub no_browser: bool,
    pub dedupe: bool,
}

/// Fetches, reorders and commits one playlist, asking for whatever the
/// options leave open.
pub async fn reorder(mut opts: ReorderOptions) -> Res<()> {
    if opts.playlist.is_none() && opts.policy.is_none() {
        info!("No arguments provided. Starting the interactive mode");
        warning!(
            "Duplicated tracks do not survive the update, most of the time a single copy is kept"
        );
        opts.interactive = true;
    }

    let credentials = Credentials::load(&opts.conf)?;
    let tokens = spotify::auth::authorize(&credentials, opts.no_browser).await?;
    let client = SpotifyClient::new(tokens);
    let mut prompter = Prompter::stdin();

    let playlist_id = match opts.playlist.clone() {
        Some(id) => id,
        None => match pick_playlist(&client, &mut prompter).await? {
            Some(id) => id,
            None => {
                info!("Cancelled");
                return Ok(());
            }
        },
    };

    let playlist = pipeline::fetch_playlist(&client, &playlist_id).await?;
    success!(
        "Using {} with {} tracks",
        playlist.name,
        playlist.tracks.len()
    );

    let policy = match opts.policy {
        Some(policy) => policy,
        None => match pick_policy(&mut prompter, &playlist.name) {
            Some(policy) => policy,
            None => {
                info!("Aborting");
                return Ok(());
            }
        },
    };

    info!("Applying {} on {}", policy, playlist.name);
    let playlist = pipeline::prepare(&client, playlist, policy, opts.order).await?;
    info!("Playlist {} locally. Applying to Spotify...", policy.describe());

    let playlist = handle_duplicates(playlist, opts.dedupe);
    let report = pipeline::commit(&client, &playlist).await?;
    success!(
        "Online playlist updated: {} tracks in {} chunk(s), snapshot {}",
        report.tracks,
        report.chunks,
        report.snapshot_id.as_deref().unwrap_or("unchanged")
    );

    if opts.interactive && !opts.image {
        opts.image = prompter.confirm(
            "Would you like to generate an image for the playlist? [y/N] ",
            false,
        );
    }

    if opts.image {
        make_cover(&client, &playlist, opts.upload_image).await?;
    }

    if opts.interactive {
        offer_schedule(&mut prompter, &playlist, policy, &opts).await;
    }

    success!("All done!");
    Ok(())
}

fn handle_duplicates(playlist: Playlist, dedupe: bool) -> Playlist {
    if dedupe {
        let (playlist, dropped) = pipeline::dedupe(playlist);
        if dropped > 0 {
            warning!("Dropped {} duplicated track(s) before updating", dropped);
        }
        return playlist;
    }

    let duplicates = pipeline::duplicate_count(&playlist);
    if duplicates > 0 {
        warning!(
            "{} track(s) appear more than once. Removal is playlist wide, so copies may be lost or moved. Use --dedupe to drop them explicitly.",
            duplicates
        );
    }
    playlist
}

async fn pick_playlist<S, R, W>(source: &S, prompter: &mut Prompter<R, W>) -> Res<Option<String>>
where
    S: TrackSource + ?Sized,
    R: BufRead,
    W: Write,
{
    let playlists = pipeline::list_user_playlists(source).await?;

    let rows: Vec<PlaylistTableRow> = playlists
        .iter()
        .enumerate()
        .map(|(i, p)| PlaylistTableRow {
            index: i + 1,
            name: p.name.clone(),
            owner: if p.collaborative {
                format!(
                    "collaborative ({})",
                    p.owner.display_name.as_deref().unwrap_or(&p.owner.id)
                )
            } else {
                "you".to_string()
            },
        })
        .collect();

    info!("Your playlists:");
    println!("{}", Table::new(rows));
    println!("0\tCancel");

    Ok(prompter
        .choose("Choose a playlist", playlists.len())
        .map(|n| playlists[n - 1].id.clone()))
}

fn pick_policy<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    playlist_name: &str,
) -> Option<Policy> {
    let policies = Policy::all();

    info!("Available actions");
    for (i, policy) in policies.iter().enumerate() {
        println!("{}\t{}", i + 1, policy);
    }
    println!("0\tCancel");

    let policy = policies[prompter.choose("What do you want to do with it?", policies.len())? - 1];
    let confirmed = prompter.confirm(
        &format!(
            "Applying {} on {}. Is that correct? [Y/n] ",
            policy, playlist_name
        ),
        true,
    );
    confirmed.then_some(policy)
}

async fn make_cover(client: &SpotifyClient, playlist: &Playlist, upload: bool) -> Res<()> {
    let image = cover::generate_cover(&playlist.uris());
    let jpeg = cover::encode_jpeg(&image)?;
    let path = cover::save_cover(&playlist.id, &jpeg).await?;
    success!("Cover image written to {}", path.display());

    if upload {
        client.upload_cover(&playlist.id, &jpeg).await?;
        success!("Cover image uploaded to {}", playlist.name);
    }
    Ok(())
}
