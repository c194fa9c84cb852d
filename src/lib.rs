//! Spotify Playlist Reorder Library
//!
//! Shuffles or sorts the tracks of a Spotify playlist and writes the new order
//! back through the Web API. The playlist is fetched page by page, reordered
//! locally, then committed in chunks of 100 tracks.
//!
//! # Modules
//!
//! - `api` - HTTP routes of the local OAuth callback server
//! - `cli` - Command-line interaction layer
//! - `config` - Credentials file and environment configuration
//! - `cover` - Deterministic cover image generation
//! - `error` - Error kinds reported by a run
//! - `management` - Token caching and refresh
//! - `pipeline` - Fetch, enrich and commit stages
//! - `policy` - Reorder policies and sort direction
//! - `reorder` - Pure reorder engine
//! - `schedule` - systemd timer generation
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API boundary and client
//! - `types` - Data structures and wire types
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod cover;
pub mod error;
pub mod management;
pub mod pipeline;
pub mod policy;
pub mod reorder;
pub mod schedule;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result type used throughout the crate.
pub type Res<T> = std::result::Result<T, error::Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching the playlist tracks...");
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the binary uses this, for errors that end the run. Library code
/// returns [`error::Error`] instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
