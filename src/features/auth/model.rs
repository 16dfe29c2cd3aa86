use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User identity as verified by the identity service. The id is the
/// rate-limiting key and the correlation id used in logs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The raw bearer session token of the current request. Carried separately
/// from [`AuthenticatedUser`] because the provider-token resolver needs it
/// for session lookups and the last-resort upstream probe.
#[derive(Clone)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Session tokens must never end up in logs via {:?}.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}
