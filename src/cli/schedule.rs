use std::io::{BufRead, Write};

use crate::{
    Res,
    cli::{Prompter, ReorderOptions},
    info,
    policy::Policy,
    schedule::{self, InstallOutcome, JobRequest},
    success,
    types::Playlist,
    warning,
};

/// Offers to install a systemd timer re-applying `policy` to `playlist` with
/// the flags of the current run.
///
/// Scheduler failures are reported as warnings: the playlist itself is already
/// committed at this point. Returns the install outcome, `None` when nothing
/// was installed.
pub async fn offer_schedule<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    playlist: &Playlist,
    policy: Policy,
    opts: &ReorderOptions,
) -> Option<InstallOutcome> {
    match schedule_job(prompter, playlist, policy, opts).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warning!("Periodic job not set up: {}", e);
            None
        }
    }
}

async fn schedule_job<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    playlist: &Playlist,
    policy: Policy,
    opts: &ReorderOptions,
) -> Res<Option<InstallOutcome>> {
    if !prompter.confirm(
        "Would you like to set up a systemd timer to apply this to the playlist periodically? [y/N] ",
        false,
    ) {
        return Ok(None);
    }

    info!(
        "Provide the interval using systemd.timer syntax (https://www.freedesktop.org/software/systemd/man/latest/systemd.time.html#Calendar%20Events)"
    );
    let interval = loop {
        let Some(interval) = prompter.ask("How often do you want to apply it? ") else {
            return Ok(None);
        };
        if !interval.is_empty() && schedule::validate_interval(&interval).await? {
            break interval;
        }
        warning!("Invalid interval");
    };

    let request = JobRequest {
        playlist_id: playlist.id.clone(),
        playlist_name: playlist.name.clone(),
        policy,
        order: opts.order,
        config_path: opts.conf.clone(),
        image: opts.image,
        upload_image: opts.upload_image,
        dedupe: opts.dedupe,
        interval,
    };
    let name = schedule::unit_name(&playlist.id);

    prompter.say(&format!(
        "\nCreating the user service {name}.service to apply {policy} on {} {}every {}.\n\
         To see the logs, use 'journalctl --user -u {name}.service'.\n\
         To disable it, use 'systemctl --user disable --now {name}.timer'.",
        playlist.name,
        if opts.upload_image {
            "and upload a new cover image "
        } else if opts.image {
            "and generate a new cover image "
        } else {
            ""
        },
        request.interval,
    ));

    if !prompter.confirm("Is that correct? [Y/n] ", true) {
        info!("Aborting");
        return Ok(None);
    }

    let outcome = schedule::install(&request).await?;
    match &outcome {
        InstallOutcome::Activated { dir } => {
            success!("Timer {}.timer enabled, units in {}", name, dir.display())
        }
        InstallOutcome::WrittenOnly { dir } => warning!(
            "No user systemd directory found. Units were written to {} and validated but are not activated.",
            dir.display()
        ),
        InstallOutcome::Unverified { dir } => warning!(
            "Couldn't validate the units. They are in {} but aren't activated.",
            dir.display()
        ),
    }

    Ok(Some(outcome))
}
