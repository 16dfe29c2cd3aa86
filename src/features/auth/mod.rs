//! Session authentication against the external identity service, plus
//! resolution of the delegated GitHub credential linked to a user.

pub mod clients;
pub mod model;
pub mod provider_token;
pub mod service;

pub use provider_token::ProviderTokenService;
pub use service::AuthService;
