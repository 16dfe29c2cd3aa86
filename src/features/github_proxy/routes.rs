use axum::{routing::post, Router};

use crate::features::github_proxy::handlers::{self, GithubProxyState};

/// Create routes for the GitHub proxy feature. POST only; other methods
/// get a 405 from the router.
pub fn routes(state: GithubProxyState) -> Router {
    Router::new()
        .route("/api/github-proxy", post(handlers::github_proxy))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use super::*;
    use crate::core::config::{GithubConfig, IdentityConfig, RateLimitConfig};
    use crate::core::middleware;
    use crate::features::auth::clients::IdentityClient;
    use crate::features::auth::{AuthService, ProviderTokenService};
    use crate::features::github_proxy::clients::GithubClient;
    use crate::features::rate_limits::{InMemoryRateLimitStore, RateLimitService};
    use crate::shared::test_helpers::with_test_session;
    use crate::shared::types::ErrorBody;

    fn unconfigured_identity() -> Arc<IdentityClient> {
        Arc::new(IdentityClient::new(IdentityConfig {
            base_url: None,
            service_key: None,
            anon_key: None,
            request_timeout: Duration::from_secs(1),
        }))
    }

    /// State whose upstreams are unreachable: requests must fail before any
    /// network call to pass these tests.
    fn test_state() -> GithubProxyState {
        let github = Arc::new(GithubClient::new(GithubConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout: Duration::from_secs(1),
        }));
        GithubProxyState {
            github: Arc::clone(&github),
            provider_tokens: Arc::new(ProviderTokenService::new(unconfigured_identity(), github)),
            rate_limits: Arc::new(RateLimitService::new(Arc::new(
                InMemoryRateLimitStore::new(),
            ))),
            quota: RateLimitConfig {
                enhance_limit: 10,
                proxy_limit: 60,
                window_secs: 3600,
            },
        }
    }

    #[tokio::test]
    async fn unsupported_endpoint_is_rejected() {
        let server = TestServer::new(with_test_session(routes(test_state()))).unwrap();

        let response = server
            .post("/api/github-proxy")
            .json(&json!({"endpoint": "repos.deleteRepo"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "Unsupported endpoint");
    }

    #[tokio::test]
    async fn invalid_parameters_are_rejected() {
        let server = TestServer::new(with_test_session(routes(test_state()))).unwrap();

        let response = server
            .post("/api/github-proxy")
            .json(&json!({"endpoint": "repos.listTags", "owner": "bad owner!", "repo": "r"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "Invalid GitHub username format");
    }

    #[tokio::test]
    async fn missing_authorization_is_unauthorized() {
        let auth = Arc::new(AuthService::new(unconfigured_identity()));
        let router = routes(test_state()).route_layer(axum::middleware::from_fn_with_state(
            auth,
            middleware::auth_middleware,
        ));
        let server = TestServer::new(router).unwrap();

        let response = server
            .post("/api/github-proxy")
            .json(&json!({"endpoint": "repos.get", "owner": "o", "repo": "r"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "Unauthorized");
    }

    #[tokio::test]
    async fn unlinked_account_requires_reauth() {
        let server = TestServer::new(with_test_session(routes(test_state()))).unwrap();

        let response = server
            .post("/api/github-proxy")
            .json(&json!({"endpoint": "repos.get", "owner": "rust-lang", "repo": "regex"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorBody = response.json();
        assert!(body.error.contains("sign out and sign in again"));
    }
}
