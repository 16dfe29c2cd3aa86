use axum::{routing::post, Router};

use crate::features::enhance::handlers::{self, EnhanceState};

/// Create routes for the enhancement feature
pub fn routes(state: EnhanceState) -> Router {
    Router::new()
        .route(
            "/api/enhance-release-notes",
            post(handlers::enhance_release_notes),
        )
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
    use crate::core::config::{OpenAiConfig, RateLimitConfig};
    use crate::features::enhance::clients::CompletionClient;
    use crate::features::rate_limits::{InMemoryRateLimitStore, RateLimitService};
    use crate::shared::test_helpers::with_test_session;
    use crate::shared::types::ErrorBody;

    /// Completion client pointing at an unreachable endpoint: handler paths
    /// up to and including the upstream call run for real, the call itself
    /// fails fast.
    fn test_state(api_key: Option<&str>) -> EnhanceState {
        EnhanceState {
            completion: Arc::new(CompletionClient::new(OpenAiConfig {
                api_key: api_key.map(|k| k.to_string()),
                base_url: "http://127.0.0.1:1".to_string(),
                model: "gpt-4o-mini".to_string(),
                request_timeout: Duration::from_secs(1),
            })),
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
    async fn short_markdown_is_rejected() {
        let server = TestServer::new(with_test_session(routes(test_state(Some("sk-test")))))
            .unwrap();

        let response = server
            .post("/api/enhance-release-notes")
            .json(&json!({"markdown": "hi"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "Invalid request: markdown content too short");
    }

    #[tokio::test]
    async fn oversized_markdown_is_rejected() {
        let server = TestServer::new(with_test_session(routes(test_state(Some("sk-test")))))
            .unwrap();

        let response = server
            .post("/api/enhance-release-notes")
            .json(&json!({"markdown": "x".repeat(10_001)}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(
            body.error,
            "Invalid request: markdown content too long (max 10000 characters)"
        );
    }

    #[tokio::test]
    async fn missing_api_key_degrades_to_500_without_spending_quota() {
        let server = TestServer::new(with_test_session(routes(test_state(None)))).unwrap();

        let response = server
            .post("/api/enhance-release-notes")
            .json(&json!({"markdown": "## Release Notes (v1...v2)"}))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn eleventh_call_in_window_is_rate_limited() {
        let server = TestServer::new(with_test_session(routes(test_state(Some("sk-test")))))
            .unwrap();
        let body = json!({"markdown": "## Release Notes (v1...v2)"});

        // Ten calls consume the window; each fails at the unreachable
        // upstream (500) but counts against the quota.
        for _ in 0..10 {
            let response = server.post("/api/enhance-release-notes").json(&body).await;
            response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        }

        let response = server.post("/api/enhance-release-notes").json(&body).await;
        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        let error: ErrorBody = response.json();
        assert_eq!(error.error, "Rate limit exceeded. Try again later.");
    }
}
