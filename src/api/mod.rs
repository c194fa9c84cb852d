//! # API Module
//!
//! HTTP routes of the short-lived local server used during authorization.
//!
//! - [`callback`] receives Spotify's redirect, checks the CSRF state and records
//!   the authorization code (or the denial) for the waiting login flow.
//! - [`health`] answers with the application version.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
