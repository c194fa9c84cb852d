//! Periodic re-application through systemd user timers.
//!
//! A job is a `.timer`/`.service` pair named `spreorder-<playlist-id>` whose
//! service runs the same CLI invocation non-interactively. Unit rendering is
//! pure; [`install`] shells out to `systemd-analyze` and `systemctl`.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::{
    Res,
    error::Error,
    policy::{Policy, SortOrder},
    utils::shell_quote,
};

#[derive(Debug, Clone)]
pub struct JobRequest {
    pub playlist_id: String,
    pub playlist_name: String,
    pub policy: Policy,
    pub order: SortOrder,
    pub config_path: PathBuf,
    pub image: bool,
    pub upload_image: bool,
    pub dedupe: bool,
    /// `OnCalendar=` expression, e.g. `daily` or `Mon *-*-* 06:00:00`.
    pub interval: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Files written, verified and the timer enabled.
    Activated { dir: PathBuf },
    /// No user unit directory found: files verified but left in `dir`.
    WrittenOnly { dir: PathBuf },
    /// `systemd-analyze verify` rejected the files.
    Unverified { dir: PathBuf },
}

pub fn unit_name(playlist_id: &str) -> String {
    format!("spreorder-{}", playlist_id)
}

pub fn description(request: &JobRequest) -> String {
    format!(
        "Apply {} to the Spotify playlist {}",
        request.policy, request.playlist_name
    )
}

/// Command line reproducing the current invocation for `exe`.
pub fn command_line(request: &JobRequest, exe: &Path) -> String {
    let mut args = vec![
        shell_quote(&exe.to_string_lossy()),
        "--playlist".to_string(),
        shell_quote(&request.playlist_id),
        "--playlist-modification".to_string(),
        shell_quote(&request.policy.to_string()),
        "--playlist-sort-order".to_string(),
        request.order.to_string(),
        "--conf".to_string(),
        shell_quote(&request.config_path.to_string_lossy()),
    ];
    if request.image {
        args.push("--image".to_string());
    }
    if request.upload_image {
        args.push("--upload-image".to_string());
    }
    if request.dedupe {
        args.push("--dedupe".to_string());
    }
    args.join(" ")
}

pub fn render_timer(request: &JobRequest) -> String {
    format!(
        "[Unit]\nDescription={}\n\n[Timer]\nOnCalendar={}\nPersistent=true\n\n[Install]\nWantedBy=timers.target\n",
        description(request),
        request.interval.trim()
    )
}

pub fn render_service(request: &JobRequest, exe: &Path, working_dir: &Path) -> String {
    format!(
        "[Unit]\nDescription={}\nAfter=network-online.target\nWants=network-online.target\n\n[Service]\nType=oneshot\nWorkingDirectory={}\nExecStart={}\n",
        description(request),
        working_dir.display(),
        command_line(request, exe)
    )
}

/// Picks the unit directory among the paths systemd reports, preferring `preferred`.
pub fn choose_unit_dir(paths: &[PathBuf], preferred: &Path) -> Option<PathBuf> {
    if paths.iter().any(|p| p == preferred) {
        return Some(preferred.to_path_buf());
    }
    paths.first().cloned()
}

fn systemd_analyze() -> Res<PathBuf> {
    which::which("systemd-analyze").map_err(|_| {
        Error::Scheduler("systemd-analyze not found, periodic jobs need systemd".to_string())
    })
}

/// Checks an `OnCalendar=` expression with `systemd-analyze calendar`.
pub async fn validate_interval(interval: &str) -> Res<bool> {
    let status = Command::new(systemd_analyze()?)
        .args(["calendar", interval.trim()])
        .status()
        .await?;
    Ok(status.success())
}

/// User unit directory, `None` when systemd reports none.
pub async fn user_unit_dir() -> Res<Option<PathBuf>> {
    let output = Command::new(systemd_analyze()?)
        .args(["--user", "unit-paths"])
        .output()
        .await?;
    if !output.status.success() {
        return Ok(None);
    }

    let paths: Vec<PathBuf> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect();

    let preferred = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("systemd/user");
    Ok(choose_unit_dir(&paths, &preferred))
}

async fn verify(path: &Path) -> Res<bool> {
    let status = Command::new(systemd_analyze()?)
        .arg("verify")
        .arg(path)
        .status()
        .await?;
    Ok(status.success())
}

/// Writes both units for `request`, verifies them and enables the timer.
pub async fn install(request: &JobRequest) -> Res<InstallOutcome> {
    let exe = std::env::current_exe()?;
    let working_dir = std::env::current_dir()?;
    let request = JobRequest {
        config_path: std::fs::canonicalize(&request.config_path)?,
        ..request.clone()
    };

    let (dir, activate) = match user_unit_dir().await? {
        Some(dir) => (dir, true),
        None => (working_dir.clone(), false),
    };
    async_fs::create_dir_all(&dir).await?;

    let name = unit_name(&request.playlist_id);
    let timer_path = dir.join(format!("{}.timer", name));
    let service_path = dir.join(format!("{}.service", name));
    async_fs::write(&timer_path, render_timer(&request)).await?;
    async_fs::write(&service_path, render_service(&request, &exe, &working_dir)).await?;

    if !verify(&timer_path).await? || !verify(&service_path).await? {
        return Ok(InstallOutcome::Unverified { dir });
    }
    if !activate {
        return Ok(InstallOutcome::WrittenOnly { dir });
    }

    let status = Command::new("systemctl")
        .args(["--user", "enable", "--now"])
        .arg(format!("{}.timer", name))
        .status()
        .await?;
    if !status.success() {
        return Err(Error::Scheduler(format!(
            "systemctl could not enable {}.timer",
            name
        )));
    }

    Ok(InstallOutcome::Activated { dir })
}
