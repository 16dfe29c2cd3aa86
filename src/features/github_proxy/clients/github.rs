//! Thin GitHub REST client covering exactly the proxied operations.

use axum::http::{header, StatusCode};
use serde_json::Value;

use crate::core::config::GithubConfig;
use crate::core::error::{AppError, Result};
use crate::features::github_proxy::operations::ProxyOperation;
use crate::shared::validation::Pagination;

/// Upstream payload plus the rate-limit headers the caller forwards.
#[derive(Debug)]
pub struct GithubResponse {
    pub data: Value,
    pub rate_limit_remaining: Option<String>,
    pub rate_limit_reset: Option<String>,
}

pub struct GithubClient {
    config: GithubConfig,
    http_client: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent("relnotes-core/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Execute a validated operation with the given provider token.
    pub async fn execute(&self, token: &str, operation: &ProxyOperation) -> Result<GithubResponse> {
        let (path, query) = request_parts(operation);
        let url = format!("{}{}", self.config.base_url, path);

        tracing::debug!("GitHub API request: {}", url);

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/vnd.github+json");
        if !query.is_empty() {
            request = request.query(&query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| request_error(operation.endpoint_name(), e))?;

        let status = response.status();

        if status.is_success() {
            let rate_limit_remaining = header_string(&response, "x-ratelimit-remaining");
            let rate_limit_reset = header_string(&response, "x-ratelimit-reset");
            let data = response.json::<Value>().await.map_err(|e| {
                AppError::UpstreamService(format!("Failed to parse GitHub response: {}", e))
            })?;
            return Ok(GithubResponse {
                data,
                rate_limit_remaining,
                rate_limit_reset,
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Auth(
                "GitHub token expired. Please sign out and sign in again.".to_string(),
            ));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::UpstreamNotFound("Resource not found".to_string()));
        }
        // Secondary rate limits come back as 403 with an exhausted quota
        // header; primary ones as 429.
        if status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN
                && header_string(&response, "x-ratelimit-remaining").as_deref() == Some("0"))
        {
            return Err(AppError::UpstreamRateLimited(
                "GitHub API rate limit exceeded. Try again later.".to_string(),
            ));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("GitHub API error: HTTP {} - {}", status, body);
        Err(AppError::UpstreamService(format!(
            "GitHub API error: HTTP {}",
            status
        )))
    }

    /// Probe whether a token is accepted by the API at all. Used as the
    /// last-resort provider-token source.
    pub async fn check_token(&self, token: &str) -> Result<bool> {
        let url = format!("{}/user", self.config.base_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| request_error("user", e))?;

        Ok(response.status().is_success())
    }
}

fn header_string(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn request_error(endpoint: &str, error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::UpstreamTimeout(format!("GitHub {} timed out: {}", endpoint, error))
    } else {
        AppError::UpstreamService(format!("GitHub {} request failed: {}", endpoint, error))
    }
}

fn pagination_query(pagination: &Pagination) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(per_page) = pagination.per_page {
        query.push(("per_page", per_page.to_string()));
    }
    if let Some(page) = pagination.page {
        query.push(("page", page.to_string()));
    }
    query
}

/// URL path and query string for each operation. Path segments are
/// percent-encoded; validated refs may still contain slashes.
fn request_parts(operation: &ProxyOperation) -> (String, Vec<(&'static str, String)>) {
    match operation {
        ProxyOperation::ListTags {
            owner,
            repo,
            pagination,
        } => (
            format!(
                "/repos/{}/{}/tags",
                urlencoding::encode(owner),
                urlencoding::encode(repo)
            ),
            pagination_query(pagination),
        ),
        ProxyOperation::CompareCommits {
            owner,
            repo,
            base,
            head,
        } => (
            format!(
                "/repos/{}/{}/compare/{}...{}",
                urlencoding::encode(owner),
                urlencoding::encode(repo),
                urlencoding::encode(base),
                urlencoding::encode(head)
            ),
            Vec::new(),
        ),
        ProxyOperation::ListForAuthenticatedUser {
            visibility,
            affiliation,
            repo_type,
            sort,
            direction,
            pagination,
        } => {
            let mut query = Vec::new();
            if let Some(visibility) = visibility {
                query.push(("visibility", visibility.clone()));
            }
            if let Some(affiliation) = affiliation {
                query.push(("affiliation", affiliation.clone()));
            }
            if let Some(repo_type) = repo_type {
                query.push(("type", repo_type.clone()));
            }
            if let Some(sort) = sort {
                query.push(("sort", sort.clone()));
            }
            if let Some(direction) = direction {
                query.push(("direction", direction.clone()));
            }
            query.extend(pagination_query(pagination));
            ("/user/repos".to_string(), query)
        }
        ProxyOperation::GetRepo { owner, repo } => (
            format!(
                "/repos/{}/{}",
                urlencoding::encode(owner),
                urlencoding::encode(repo)
            ),
            Vec::new(),
        ),
    }
}
