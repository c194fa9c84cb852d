//! # CLI Module
//!
//! The interaction layer. It only gathers inputs (playlist id, policy,
//! confirmations) and reports progress; fetching, reordering and committing
//! live in [`crate::pipeline`] and never touch the terminal's input.
//!
//! - [`auth`] - authorize with Spotify and cache the token
//! - [`reorder`] - the main command: pick, reorder and commit a playlist,
//!   optionally followed by a cover image and a periodic job
//! - [`Prompter`] - line based menus that re-ask on invalid input

mod auth;
mod prompt;
mod reorder;
mod schedule;

pub use auth::auth;
pub use prompt::Prompter;
pub use reorder::{ReorderOptions, reorder};
pub use schedule::offer_schedule;
