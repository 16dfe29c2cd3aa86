//! HTTP client for the identity service's auth API.
//!
//! Covers the four calls this backend needs: session-token verification,
//! session lookup, forced session refresh and the admin user lookup used
//! as a stale fallback for provider credentials.

use axum::http::StatusCode;
use serde::Deserialize;

use crate::core::config::IdentityConfig;
use crate::core::error::{AppError, Result};

/// User record from the identity service
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Provider linkage metadata; may carry a (possibly stale) delegated
    /// token under `provider_token` or `github_token`.
    #[serde(default)]
    pub app_metadata: serde_json::Value,
}

/// Session record from the identity service
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySession {
    /// Delegated OAuth provider token, present while the linkage is fresh
    #[serde(default)]
    pub provider_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

pub struct IdentityClient {
    config: IdentityConfig,
    http_client: reqwest::Client,
}

impl IdentityClient {
    pub fn new(config: IdentityConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Required configuration, or a per-request configuration error. The
    /// process keeps serving; only requests that need the identity service
    /// degrade to a 500.
    fn credentials(&self) -> Result<(&str, &str)> {
        match (
            self.config.base_url.as_deref(),
            self.config.service_key.as_deref(),
        ) {
            (Some(base_url), Some(service_key)) => Ok((base_url, service_key)),
            _ => Err(AppError::Configuration(
                "IDENTITY_SERVICE_URL and IDENTITY_SERVICE_KEY must be set".to_string(),
            )),
        }
    }

    /// Exchange a session token for the user it belongs to.
    pub async fn get_user(&self, session_token: &str) -> Result<IdentityUser> {
        let (base_url, service_key) = self.credentials()?;
        let api_key = self.config.anon_key.as_deref().unwrap_or(service_key);
        let url = format!("{}/auth/v1/user", base_url);

        tracing::debug!("Verifying session token with identity service: {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", api_key)
            .bearer_auth(session_token)
            .send()
            .await
            .map_err(|e| request_error("identity user lookup", e))?;

        self.parse_response(response, "user lookup").await
    }

    /// Current session for a session token, if the identity service still
    /// holds one.
    pub async fn get_session(&self, session_token: &str) -> Result<IdentitySession> {
        let (base_url, service_key) = self.credentials()?;
        let api_key = self.config.anon_key.as_deref().unwrap_or(service_key);
        let url = format!("{}/auth/v1/session", base_url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", api_key)
            .bearer_auth(session_token)
            .send()
            .await
            .map_err(|e| request_error("identity session lookup", e))?;

        self.parse_response(response, "session lookup").await
    }

    /// Force a session refresh; a refreshed session carries freshly minted
    /// provider tokens when the linkage is intact.
    pub async fn refresh_session(&self, session_token: &str) -> Result<IdentitySession> {
        let (base_url, service_key) = self.credentials()?;
        let api_key = self.config.anon_key.as_deref().unwrap_or(service_key);
        let url = format!("{}/auth/v1/session/refresh", base_url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", api_key)
            .bearer_auth(session_token)
            .send()
            .await
            .map_err(|e| request_error("identity session refresh", e))?;

        self.parse_response(response, "session refresh").await
    }

    /// Admin lookup by user id, authenticated with the service key. Used to
    /// read provider metadata that may be stale.
    pub async fn admin_get_user(&self, user_id: &str) -> Result<IdentityUser> {
        let (base_url, service_key) = self.credentials()?;
        let url = format!(
            "{}/auth/v1/admin/users/{}",
            base_url,
            urlencoding::encode(user_id)
        );

        let response = self
            .http_client
            .get(&url)
            .header("apikey", service_key)
            .bearer_auth(service_key)
            .send()
            .await
            .map_err(|e| request_error("identity admin user lookup", e))?;

        self.parse_response(response, "admin user lookup").await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        operation: &str,
    ) -> Result<T> {
        let status = response.status().as_u16();

        if status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16()
        {
            return Err(AppError::Auth("Invalid token".to_string()));
        }

        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                "Identity service {} failed: HTTP {} - {}",
                operation,
                status,
                body
            );
            return Err(AppError::UpstreamService(format!(
                "Identity service {} failed: HTTP {}",
                operation, status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse identity service response: {}", e);
            AppError::UpstreamService(format!(
                "Failed to parse identity service {} response: {}",
                operation, e
            ))
        })
    }
}

fn request_error(operation: &str, error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::UpstreamTimeout(format!("{} timed out: {}", operation, error))
    } else {
        AppError::UpstreamService(format!("{} failed: {}", operation, error))
    }
}
