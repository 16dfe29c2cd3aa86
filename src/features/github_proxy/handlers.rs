use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};

use crate::core::config::RateLimitConfig;
use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::core::logging::{log_external_api, log_rate_limit};
use crate::features::auth::model::{AuthenticatedUser, SessionToken};
use crate::features::auth::ProviderTokenService;
use crate::features::github_proxy::clients::GithubClient;
use crate::features::github_proxy::dtos::{
    GithubProxyRequestDto, GithubProxyResponseDto, GithubRateLimitHeadersDto,
};
use crate::features::github_proxy::operations::ProxyOperation;
use crate::features::rate_limits::RateLimitService;
use crate::shared::types::ErrorBody;

#[derive(Clone)]
pub struct GithubProxyState {
    pub github: Arc<GithubClient>,
    pub provider_tokens: Arc<ProviderTokenService>,
    pub rate_limits: Arc<RateLimitService>,
    pub quota: RateLimitConfig,
}

/// Proxy an allow-listed GitHub API operation
///
/// Pipeline: rate limit → per-endpoint parameter validation → provider
/// token resolution → upstream call. The delegated credential never leaves
/// the server.
#[utoipa::path(
    post,
    path = "/api/github-proxy",
    request_body = GithubProxyRequestDto,
    responses(
        (status = 200, description = "Upstream response with quota headers", body = GithubProxyResponseDto),
        (status = 400, description = "Unsupported endpoint or invalid parameters", body = ErrorBody),
        (status = 401, description = "Invalid session or expired GitHub linkage", body = ErrorBody),
        (status = 404, description = "Upstream resource not found", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
        (status = 500, description = "Configuration or upstream failure", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "github-proxy"
)]
pub async fn github_proxy(
    State(state): State<GithubProxyState>,
    user: AuthenticatedUser,
    session: SessionToken,
    AppJson(dto): AppJson<GithubProxyRequestDto>,
) -> Result<Json<GithubProxyResponseDto>> {
    let decision = state
        .rate_limits
        .check_and_consume(&user.id, state.quota.proxy_limit, state.quota.window())
        .await;
    log_rate_limit(&user.id, decision.allowed, state.quota.proxy_limit, decision.count);
    if !decision.allowed {
        return Err(AppError::RateLimitExceeded(
            "Rate limit exceeded. Try again later.".to_string(),
        ));
    }

    let operation =
        ProxyOperation::from_request(&dto.endpoint, &dto.params).map_err(AppError::Validation)?;

    let provider_token = state.provider_tokens.resolve(&user, &session).await?;

    let started = Instant::now();
    let result = state.github.execute(&provider_token, &operation).await;
    let duration_ms = started.elapsed().as_millis() as u64;
    let error_text = result.as_ref().err().map(|e| e.to_string());
    log_external_api(
        "github",
        operation.endpoint_name(),
        result.is_ok(),
        duration_ms,
        error_text.as_deref(),
    );

    let response = result?;
    tracing::info!(
        endpoint = operation.endpoint_name(),
        user_id = %user.id,
        "GitHub API call proxied"
    );

    Ok(Json(GithubProxyResponseDto {
        data: response.data,
        headers: GithubRateLimitHeadersDto {
            remaining: response.rate_limit_remaining,
            reset: response.rate_limit_reset,
        },
    }))
}
