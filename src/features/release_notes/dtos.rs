use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to generate notes for a ref range. Fields default to empty so
/// the shared field validators produce their "required" messages.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateReleaseNotesDto {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub head: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReleaseNotesResponseDto {
    pub markdown: String,
    pub counts: CategoryCountsDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCountsDto {
    pub features: usize,
    pub fixes: usize,
    pub breaking_changes: usize,
    pub others: usize,
}
