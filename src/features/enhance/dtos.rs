use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::shared::constants::{MARKDOWN_MAX_LENGTH, MARKDOWN_MIN_LENGTH};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EnhanceRequestDto {
    /// Markdown release notes to rewrite (10-10000 characters)
    #[serde(default)]
    #[validate(custom(function = validate_markdown_body))]
    pub markdown: String,
}

fn markdown_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_markdown_body(markdown: &str) -> Result<(), ValidationError> {
    let length = markdown.chars().count();
    if length == 0 {
        return Err(markdown_error(
            "required",
            "Invalid request: markdown field is required",
        ));
    }
    if length < MARKDOWN_MIN_LENGTH {
        return Err(markdown_error(
            "too_short",
            "Invalid request: markdown content too short",
        ));
    }
    if length > MARKDOWN_MAX_LENGTH {
        return Err(markdown_error(
            "too_long",
            "Invalid request: markdown content too long (max 10000 characters)",
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnhanceResponseDto {
    pub enhanced: String,
    pub usage: EnhanceUsageDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceUsageDto {
    /// Enhancement calls left in the current window
    pub requests_remaining: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(markdown: &str) -> EnhanceRequestDto {
        EnhanceRequestDto {
            markdown: markdown.to_string(),
        }
    }

    #[test]
    fn accepts_reasonable_markdown() {
        assert!(dto("## Release Notes (v1...v2)").validate().is_ok());
    }

    #[test]
    fn rejects_out_of_bounds_markdown() {
        assert!(dto("").validate().is_err());
        assert!(dto("too short").validate().is_err());
        assert!(dto(&"x".repeat(10_001)).validate().is_err());
        // boundary values are accepted
        assert!(dto(&"x".repeat(10)).validate().is_ok());
        assert!(dto(&"x".repeat(10_000)).validate().is_ok());
    }
}
