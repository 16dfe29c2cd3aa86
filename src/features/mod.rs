pub mod auth;
pub mod enhance;
pub mod github_proxy;
pub mod rate_limits;
pub mod release_notes;
