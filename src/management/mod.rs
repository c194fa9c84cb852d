mod auth;

pub use auth::TokenManager;
pub use auth::token_from_json;
