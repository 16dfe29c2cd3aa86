//! Resolution of the delegated GitHub credential bound to a user.
//!
//! There is no single reliable home for this token: a fresh session carries
//! it, a stale one may not, the identity service keeps a possibly-outdated
//! copy in user metadata, and some deployments hand out sessions whose own
//! access token is already accepted by GitHub. The resolver runs an ordered
//! list of sources, stops at the first hit and records every attempt, since
//! this is the most failure-prone path in the system.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::features::auth::clients::IdentityClient;
use crate::features::auth::model::{AuthenticatedUser, SessionToken};
use crate::features::github_proxy::clients::GithubClient;

/// Metadata keys the identity service may store a provider token under,
/// checked in order.
const METADATA_TOKEN_KEYS: [&str; 2] = ["provider_token", "github_token"];

/// One place a provider token might live. `Ok(None)` means the source is
/// healthy but holds no credential; `Err` is a lookup failure. Both are
/// recorded and the resolver moves on.
#[async_trait]
trait ProviderTokenSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(
        &self,
        user: &AuthenticatedUser,
        session: &SessionToken,
    ) -> Result<Option<String>>;
}

/// Source 1: the current session object.
struct SessionSource {
    identity: Arc<IdentityClient>,
}

#[async_trait]
impl ProviderTokenSource for SessionSource {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn resolve(
        &self,
        _user: &AuthenticatedUser,
        session: &SessionToken,
    ) -> Result<Option<String>> {
        let current = self.identity.get_session(session.as_str()).await?;
        Ok(current.provider_token.filter(|t| !t.is_empty()))
    }
}

/// Source 2: force a refresh; a refreshed session carries newly minted
/// provider tokens when the linkage is intact.
struct RefreshedSessionSource {
    identity: Arc<IdentityClient>,
}

#[async_trait]
impl ProviderTokenSource for RefreshedSessionSource {
    fn name(&self) -> &'static str {
        "refreshed-session"
    }

    async fn resolve(
        &self,
        _user: &AuthenticatedUser,
        session: &SessionToken,
    ) -> Result<Option<String>> {
        let refreshed = self.identity.refresh_session(session.as_str()).await?;
        Ok(refreshed.provider_token.filter(|t| !t.is_empty()))
    }
}

/// Source 3: provider metadata on the user record. May be stale.
struct UserMetadataSource {
    identity: Arc<IdentityClient>,
}

#[async_trait]
impl ProviderTokenSource for UserMetadataSource {
    fn name(&self) -> &'static str {
        "user-metadata"
    }

    async fn resolve(
        &self,
        user: &AuthenticatedUser,
        _session: &SessionToken,
    ) -> Result<Option<String>> {
        let record = self.identity.admin_get_user(&user.id).await?;
        let token = METADATA_TOKEN_KEYS.iter().find_map(|key| {
            record
                .app_metadata
                .get(key)
                .and_then(|value| value.as_str())
                .filter(|token| !token.is_empty())
                .map(|token| token.to_string())
        });
        Ok(token)
    }
}

/// Source 4, last resort: probe whether the session's own access token is
/// accepted by the upstream API.
struct SessionTokenProbe {
    github: Arc<GithubClient>,
}

#[async_trait]
impl ProviderTokenSource for SessionTokenProbe {
    fn name(&self) -> &'static str {
        "session-token-probe"
    }

    async fn resolve(
        &self,
        _user: &AuthenticatedUser,
        session: &SessionToken,
    ) -> Result<Option<String>> {
        if self.github.check_token(session.as_str()).await? {
            Ok(Some(session.as_str().to_string()))
        } else {
            Ok(None)
        }
    }
}

pub struct ProviderTokenService {
    sources: Vec<Box<dyn ProviderTokenSource>>,
}

impl ProviderTokenService {
    pub fn new(identity: Arc<IdentityClient>, github: Arc<GithubClient>) -> Self {
        Self {
            sources: vec![
                Box::new(SessionSource {
                    identity: Arc::clone(&identity),
                }),
                Box::new(RefreshedSessionSource {
                    identity: Arc::clone(&identity),
                }),
                Box::new(UserMetadataSource { identity }),
                Box::new(SessionTokenProbe { github }),
            ],
        }
    }

    /// Try each source in priority order, short-circuiting on the first
    /// credential. Exhaustion is the terminal, user-actionable case: the
    /// account must be re-linked, so the error is distinct from transient
    /// failures.
    pub async fn resolve(
        &self,
        user: &AuthenticatedUser,
        session: &SessionToken,
    ) -> Result<String> {
        let mut failures: Vec<String> = Vec::new();

        for source in &self.sources {
            match source.resolve(user, session).await {
                Ok(Some(token)) => {
                    tracing::info!(
                        source = source.name(),
                        user_id = %user.id,
                        "Provider token resolved"
                    );
                    return Ok(token);
                }
                Ok(None) => {
                    tracing::debug!(
                        source = source.name(),
                        user_id = %user.id,
                        "Provider token source holds no credential"
                    );
                    failures.push(format!("{}: no credential", source.name()));
                }
                Err(error) => {
                    tracing::warn!(
                        source = source.name(),
                        user_id = %user.id,
                        error = %error,
                        "Provider token source failed"
                    );
                    failures.push(format!("{}: {}", source.name(), error));
                }
            }
        }

        tracing::warn!(
            user_id = %user.id,
            attempts = ?failures,
            "Provider token resolution exhausted all sources"
        );
        Err(AppError::ReauthRequired(
            "GitHub authentication required. Please sign out and sign in again.".to_string(),
        ))
    }
}
