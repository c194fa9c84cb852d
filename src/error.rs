//! Error kinds surfaced by spreorder.
//!
//! Every stage of a run (configuration, authorization, fetch, commit, and the
//! optional scheduler and cover steps) reports failures through [`Error`]. Menu
//! input problems never reach this type; the interaction layer re-prompts instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read or parsed.
    #[error("cannot load configuration from {}: {reason}", path.display())]
    ConfigMissing { path: PathBuf, reason: String },

    /// The credential exchange or token refresh was rejected.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// Playlist id unknown to Spotify, or no playlists visible to the account.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unknown playlist modification '{0}'")]
    InvalidPolicy(String),

    /// A single remote call failed. During a commit this only happens when the
    /// first removal fails, so the remote playlist is unchanged.
    #[error("{stage} failed: {reason}")]
    RemoteCallFailure { stage: String, reason: String },

    /// A commit call failed after the remote playlist was modified: a later
    /// chunk failed, or a chunk's append failed after its removal.
    #[error(
        "{stage} failed after {committed} of {total} chunks committed. \
         The remote playlist now mixes the old and the new order: {reason}"
    )]
    PartialCommit {
        stage: String,
        committed: usize,
        total: usize,
        reason: String,
    },

    #[error("scheduler: {0}")]
    Scheduler(String),

    #[error("cover image: {0}")]
    Cover(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps any displayable failure as a [`Error::RemoteCallFailure`] for `stage`.
    pub fn remote(stage: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::RemoteCallFailure {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Renames the stage of a [`Error::RemoteCallFailure`]; other kinds pass through.
    pub fn at_stage(self, stage: impl Into<String>) -> Self {
        match self {
            Error::RemoteCallFailure { reason, .. } => Error::RemoteCallFailure {
                stage: stage.into(),
                reason,
            },
            other => other,
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Cover(err.to_string())
    }
}
