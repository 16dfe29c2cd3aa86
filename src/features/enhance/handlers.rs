use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::config::RateLimitConfig;
use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::core::logging::{log_external_api, log_rate_limit};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::enhance::clients::CompletionClient;
use crate::features::enhance::dtos::{EnhanceRequestDto, EnhanceResponseDto, EnhanceUsageDto};
use crate::features::rate_limits::RateLimitService;
use crate::shared::types::ErrorBody;
use crate::shared::validation::{first_validation_message, sanitize_markdown};

#[derive(Clone)]
pub struct EnhanceState {
    pub completion: Arc<CompletionClient>,
    pub rate_limits: Arc<RateLimitService>,
    pub quota: RateLimitConfig,
}

/// Rewrite release notes with the completion API
///
/// The configuration check runs before the rate limiter so a misconfigured
/// deployment does not eat into user quotas; the body is sanitized before
/// it is sent upstream. Note content is never logged.
#[utoipa::path(
    post,
    path = "/api/enhance-release-notes",
    request_body = EnhanceRequestDto,
    responses(
        (status = 200, description = "Enhanced notes with remaining quota", body = EnhanceResponseDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
        (status = 500, description = "Configuration or service failure", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "enhance"
)]
pub async fn enhance_release_notes(
    State(state): State<EnhanceState>,
    user: AuthenticatedUser,
    AppJson(dto): AppJson<EnhanceRequestDto>,
) -> Result<Json<EnhanceResponseDto>> {
    state.completion.ensure_configured()?;

    let decision = state
        .rate_limits
        .check_and_consume(&user.id, state.quota.enhance_limit, state.quota.window())
        .await;
    log_rate_limit(
        &user.id,
        decision.allowed,
        state.quota.enhance_limit,
        decision.count,
    );
    if !decision.allowed {
        return Err(AppError::RateLimitExceeded(
            "Rate limit exceeded. Try again later.".to_string(),
        ));
    }

    dto.validate()
        .map_err(|e| AppError::Validation(first_validation_message(&e)))?;

    let sanitized = sanitize_markdown(&dto.markdown);

    let started = Instant::now();
    let result = state.completion.enhance(&sanitized).await;
    let duration_ms = started.elapsed().as_millis() as u64;
    let error_text = result.as_ref().err().map(|e| e.to_string());
    log_external_api(
        "openai",
        "chat.completions",
        result.is_ok(),
        duration_ms,
        error_text.as_deref(),
    );

    let enhanced = result?;
    tracing::info!(user_id = %user.id, "AI enhancement used");

    Ok(Json(EnhanceResponseDto {
        enhanced,
        usage: EnhanceUsageDto {
            requests_remaining: decision.remaining,
        },
    }))
}
