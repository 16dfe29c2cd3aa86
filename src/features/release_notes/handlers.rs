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
use crate::features::github_proxy::operations::ProxyOperation;
use crate::features::rate_limits::RateLimitService;
use crate::features::release_notes::dtos::{
    CategoryCountsDto, GenerateReleaseNotesDto, ReleaseNotesResponseDto,
};
use crate::features::release_notes::generator::{categorize, generate_markdown};
use crate::features::release_notes::models::commits_from_compare;
use crate::shared::types::ErrorBody;
use crate::shared::validation::{validate_owner, validate_ref, validate_repo_name};

#[derive(Clone)]
pub struct ReleaseNotesState {
    pub github: Arc<GithubClient>,
    pub provider_tokens: Arc<ProviderTokenService>,
    pub rate_limits: Arc<RateLimitService>,
    pub quota: RateLimitConfig,
}

/// Generate categorized release notes for a ref range
///
/// Server-side rendition of the comparison → classification → formatting
/// flow; shares the GitHub proxy quota since it spends the same upstream
/// budget.
#[utoipa::path(
    post,
    path = "/api/release-notes",
    request_body = GenerateReleaseNotesDto,
    responses(
        (status = 200, description = "Formatted notes with category counts", body = ReleaseNotesResponseDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Invalid session or expired GitHub linkage", body = ErrorBody),
        (status = 404, description = "Unknown repository or ref", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
        (status = 500, description = "Configuration or upstream failure", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "release-notes"
)]
pub async fn generate_release_notes(
    State(state): State<ReleaseNotesState>,
    user: AuthenticatedUser,
    session: SessionToken,
    AppJson(dto): AppJson<GenerateReleaseNotesDto>,
) -> Result<Json<ReleaseNotesResponseDto>> {
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

    let owner = validate_owner(&dto.owner).map_err(AppError::Validation)?;
    let repo = validate_repo_name(&dto.repo).map_err(AppError::Validation)?;
    let base = validate_ref(&dto.base)
        .map_err(|e| AppError::Validation(format!("Base {}", e)))?;
    let head = validate_ref(&dto.head)
        .map_err(|e| AppError::Validation(format!("Head {}", e)))?;

    let provider_token = state.provider_tokens.resolve(&user, &session).await?;

    let operation = ProxyOperation::CompareCommits {
        owner: owner.clone(),
        repo: repo.clone(),
        base: base.clone(),
        head: head.clone(),
    };

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
    let commits = commits_from_compare(&response.data)?;
    let categorized = categorize(commits);

    let repo_url = format!("https://github.com/{}/{}", owner, repo);
    let markdown = generate_markdown(&categorized, &repo_url, &base, &head);

    tracing::info!(
        user_id = %user.id,
        commits = categorized.total(),
        "Release notes generated"
    );

    Ok(Json(ReleaseNotesResponseDto {
        counts: CategoryCountsDto {
            features: categorized.features.len(),
            fixes: categorized.fixes.len(),
            breaking_changes: categorized.breaking_changes.len(),
            others: categorized.others.len(),
        },
        markdown,
    }))
}
