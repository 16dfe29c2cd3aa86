use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::core::logging::log_auth;
use crate::features::auth::clients::IdentityClient;
use crate::features::auth::model::{AuthenticatedUser, SessionToken};

/// Verifies bearer session tokens against the identity service.
pub struct AuthService {
    identity: Arc<IdentityClient>,
}

impl AuthService {
    pub fn new(identity: Arc<IdentityClient>) -> Self {
        Self { identity }
    }

    /// Validate an `Authorization` header value and exchange the session
    /// token for a user identity.
    ///
    /// Any malformed header or rejected token maps to a 401; configuration
    /// problems stay 500 so a missing secret is not mistaken for a bad
    /// credential.
    pub async fn verify_bearer(
        &self,
        auth_header: Option<&str>,
    ) -> Result<(AuthenticatedUser, SessionToken)> {
        let auth_header = match auth_header {
            Some(header) => header,
            None => {
                log_auth(false, None, Some("Missing authorization header"));
                return Err(AppError::Auth("Unauthorized".to_string()));
            }
        };

        let token = match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.is_empty() => token,
            _ => {
                log_auth(false, None, Some("Invalid authorization header format"));
                return Err(AppError::Auth("Unauthorized".to_string()));
            }
        };

        match self.identity.get_user(token).await {
            Ok(user) => {
                log_auth(true, Some(&user.id), None);
                Ok((
                    AuthenticatedUser {
                        id: user.id,
                        email: user.email,
                    },
                    SessionToken::new(token),
                ))
            }
            Err(error @ AppError::Configuration(_)) => Err(error),
            Err(error) => {
                log_auth(false, None, Some(&error.to_string()));
                Err(AppError::Auth("Invalid token".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::IdentityConfig;
    use std::time::Duration;

    fn unconfigured_service() -> AuthService {
        AuthService::new(Arc::new(IdentityClient::new(IdentityConfig {
            base_url: None,
            service_key: None,
            anon_key: None,
            request_timeout: Duration::from_secs(1),
        })))
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let service = unconfigured_service();
        let error = service.verify_bearer(None).await.unwrap_err();
        assert!(matches!(error, AppError::Auth(msg) if msg == "Unauthorized"));
    }

    #[tokio::test]
    async fn non_bearer_header_is_unauthorized() {
        let service = unconfigured_service();
        let error = service
            .verify_bearer(Some("Basic dXNlcjpwYXNz"))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Auth(_)));

        let error = service.verify_bearer(Some("Bearer ")).await.unwrap_err();
        assert!(matches!(error, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn missing_identity_config_degrades_to_configuration_error() {
        let service = unconfigured_service();
        let error = service
            .verify_bearer(Some("Bearer some-session-token"))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Configuration(_)));
    }
}
