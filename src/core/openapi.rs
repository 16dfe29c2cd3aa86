use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::enhance::{dtos as enhance_dtos, handlers as enhance_handlers};
use crate::features::github_proxy::{dtos as github_proxy_dtos, handlers as github_proxy_handlers};
use crate::features::release_notes::{
    dtos as release_notes_dtos, handlers as release_notes_handlers,
};
use crate::shared::types::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    paths(
        enhance_handlers::enhance_release_notes,
        github_proxy_handlers::github_proxy,
        release_notes_handlers::generate_release_notes,
    ),
    components(
        schemas(
            ErrorBody,
            enhance_dtos::EnhanceRequestDto,
            enhance_dtos::EnhanceResponseDto,
            enhance_dtos::EnhanceUsageDto,
            github_proxy_dtos::GithubProxyRequestDto,
            github_proxy_dtos::GithubProxyResponseDto,
            github_proxy_dtos::GithubRateLimitHeadersDto,
            release_notes_dtos::GenerateReleaseNotesDto,
            release_notes_dtos::ReleaseNotesResponseDto,
            release_notes_dtos::CategoryCountsDto,
        )
    ),
    tags(
        (name = "enhance", description = "AI release-note enhancement"),
        (name = "github-proxy", description = "Rate-limited GitHub API proxy"),
        (name = "release-notes", description = "Release note generation from commit history"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Relnotes API",
        version = "0.1.0",
        description = "Release notes backend: GitHub proxy and AI enhancement",
    )
)]
pub struct ApiDoc;

/// Adds the bearer session-token security scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
