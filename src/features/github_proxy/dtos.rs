use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Proxy request: the upstream operation name plus its parameters, which
/// are validated per endpoint before anything leaves the process.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GithubProxyRequestDto {
    /// One of: repos.listTags, repos.compareCommits,
    /// repos.listForAuthenticatedUser, repos.get
    pub endpoint: String,

    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub params: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GithubProxyResponseDto {
    #[schema(value_type = Object)]
    pub data: Value,
    pub headers: GithubRateLimitHeadersDto,
}

/// Upstream quota headers forwarded so clients can pace themselves.
#[derive(Debug, Serialize, ToSchema)]
pub struct GithubRateLimitHeadersDto {
    #[serde(rename = "x-ratelimit-remaining", skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
    #[serde(rename = "x-ratelimit-reset", skip_serializing_if = "Option::is_none")]
    pub reset: Option<String>,
}
