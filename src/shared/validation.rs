//! Field-level validators for GitHub identifiers and free-text input.
//!
//! Every validator is a pure function returning either the cleaned value or
//! a human-readable error string; callers map errors onto
//! [`crate::core::error::AppError::Validation`].

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use validator::ValidationErrors;

use crate::shared::constants::{
    MARKDOWN_MAX_LENGTH, MAX_OWNER_LENGTH, MAX_REF_LENGTH, MAX_REPO_NAME_LENGTH,
};

lazy_static! {
    /// GitHub account names: word characters, dot, hyphen
    pub static ref GITHUB_OWNER_REGEX: Regex = Regex::new(r"^[\w.-]+$").unwrap();

    /// Repository names share the owner charset
    pub static ref GITHUB_REPO_NAME_REGEX: Regex = Regex::new(r"^[\w.-]+$").unwrap();

    /// Refs additionally allow slashes (e.g. "release/v2.1")
    pub static ref GITHUB_REF_REGEX: Regex = Regex::new(r"^[\w./-]+$").unwrap();

    // Markdown sanitizer patterns. Unclosed tags are left alone, matching
    // the closing-tag requirement of the rules these reproduce.
    static ref SCRIPT_BLOCK_REGEX: Regex = Regex::new(r"(?is)<script\b.*?</script>").unwrap();
    static ref IFRAME_BLOCK_REGEX: Regex = Regex::new(r"(?is)<iframe\b.*?</iframe>").unwrap();
    static ref OBJECT_BLOCK_REGEX: Regex = Regex::new(r"(?is)<object\b.*?</object>").unwrap();
    static ref EMBED_BLOCK_REGEX: Regex = Regex::new(r"(?is)<embed\b.*?</embed>").unwrap();
    static ref JAVASCRIPT_URI_REGEX: Regex = Regex::new(r"(?i)javascript:").unwrap();
    static ref EVENT_HANDLER_REGEX: Regex = Regex::new(r"(?i)on\w+\s*=").unwrap();
}

pub fn validate_owner(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("Username is required and must be a string".to_string());
    }
    if raw.len() > MAX_OWNER_LENGTH {
        return Err("Username must be 39 characters or less".to_string());
    }
    if !GITHUB_OWNER_REGEX.is_match(raw) {
        return Err("Invalid GitHub username format".to_string());
    }
    Ok(raw.trim().to_string())
}

pub fn validate_repo_name(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("Repository name is required and must be a string".to_string());
    }
    if raw.len() > MAX_REPO_NAME_LENGTH {
        return Err("Repository name must be 100 characters or less".to_string());
    }
    if !GITHUB_REPO_NAME_REGEX.is_match(raw) {
        return Err("Invalid repository name format".to_string());
    }
    Ok(raw.trim().to_string())
}

pub fn validate_ref(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("Reference is required and must be a string".to_string());
    }
    if raw.len() > MAX_REF_LENGTH {
        return Err("Reference must be 255 characters or less".to_string());
    }
    if !GITHUB_REF_REGEX.is_match(raw) {
        return Err("Invalid reference format".to_string());
    }
    Ok(raw.trim().to_string())
}

/// Validated pagination parameters. Absent values stay absent; defaults are
/// the upstream API's business, not ours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl Pagination {
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.per_page.is_none() && self.page.is_none()
    }
}

/// Accepts JSON numbers as well as numeric strings, like a query-string
/// parser would.
fn parse_integer_param(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn validate_pagination(params: &Map<String, Value>) -> Result<Pagination, String> {
    let mut validated = Pagination::default();

    if let Some(raw) = params.get("per_page") {
        match parse_integer_param(raw) {
            Some(per_page) if (1..=100).contains(&per_page) => {
                validated.per_page = Some(per_page as u32);
            }
            _ => return Err("per_page must be between 1 and 100".to_string()),
        }
    }

    if let Some(raw) = params.get("page") {
        match parse_integer_param(raw) {
            Some(page) if page >= 1 => {
                validated.page = Some(page as u32);
            }
            _ => return Err("page must be a positive integer".to_string()),
        }
    }

    Ok(validated)
}

/// Membership check for enumerated fields; returns the value unchanged.
pub fn validate_enum(value: &str, allowed: &[&str], error: &str) -> Result<String, String> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(error.to_string())
    }
}

/// Comma-separated list where every element must belong to the allowed set.
/// The original string is kept; the upstream API takes it verbatim.
pub fn validate_enum_list(value: &str, allowed: &[&str], error: &str) -> Result<String, String> {
    let all_valid = value
        .split(',')
        .map(|item| item.trim())
        .all(|item| allowed.contains(&item));
    if all_valid {
        Ok(value.to_string())
    } else {
        Err(error.to_string())
    }
}

/// Strip script/iframe/object/embed blocks, `javascript:` URIs and inline
/// event-handler attributes, then trim and truncate to the maximum markdown
/// length.
pub fn sanitize_markdown(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let cleaned = SCRIPT_BLOCK_REGEX.replace_all(markdown, "");
    let cleaned = IFRAME_BLOCK_REGEX.replace_all(&cleaned, "");
    let cleaned = OBJECT_BLOCK_REGEX.replace_all(&cleaned, "");
    let cleaned = EMBED_BLOCK_REGEX.replace_all(&cleaned, "");
    let cleaned = JAVASCRIPT_URI_REGEX.replace_all(&cleaned, "");
    let cleaned = EVENT_HANDLER_REGEX.replace_all(&cleaned, "");

    cleaned.trim().chars().take(MARKDOWN_MAX_LENGTH).collect()
}

/// Pull the first human-readable message out of a `validator` error set.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field_errors| field_errors.iter())
        .filter_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| errors.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn owner_accepts_word_chars_dot_hyphen() {
        assert_eq!(validate_owner("rust-lang").unwrap(), "rust-lang");
        assert_eq!(validate_owner("user.name_1").unwrap(), "user.name_1");
    }

    #[test]
    fn owner_rejects_invalid_input() {
        assert!(validate_owner("").is_err());
        assert!(validate_owner("has space").is_err());
        assert!(validate_owner("semi;colon").is_err());
        assert!(validate_owner("slash/name").is_err());
        assert_eq!(
            validate_owner(&"a".repeat(40)).unwrap_err(),
            "Username must be 39 characters or less"
        );
        // exactly at the cap is fine
        assert!(validate_owner(&"a".repeat(39)).is_ok());
    }

    #[test]
    fn repo_name_bounds() {
        assert!(validate_repo_name(&"r".repeat(100)).is_ok());
        assert_eq!(
            validate_repo_name(&"r".repeat(101)).unwrap_err(),
            "Repository name must be 100 characters or less"
        );
    }

    #[test]
    fn refs_allow_slashes_owners_do_not() {
        assert_eq!(validate_ref("release/v2.1").unwrap(), "release/v2.1");
        assert!(validate_owner("release/v2.1").is_err());
        assert!(validate_ref("v1.0.0").is_ok());
        assert!(validate_ref("ref with space").is_err());
        assert!(validate_ref(&"r".repeat(256)).is_err());
    }

    #[test]
    fn pagination_bounds() {
        let params = json!({"per_page": 50, "page": 2});
        let validated = validate_pagination(params.as_object().unwrap()).unwrap();
        assert_eq!(validated.per_page, Some(50));
        assert_eq!(validated.page, Some(2));

        let params = json!({"per_page": 101});
        assert_eq!(
            validate_pagination(params.as_object().unwrap()).unwrap_err(),
            "per_page must be between 1 and 100"
        );

        let params = json!({"per_page": 0});
        assert!(validate_pagination(params.as_object().unwrap()).is_err());

        let params = json!({"page": -1});
        assert_eq!(
            validate_pagination(params.as_object().unwrap()).unwrap_err(),
            "page must be a positive integer"
        );
    }

    #[test]
    fn pagination_accepts_numeric_strings_and_omits_absent() {
        let params = json!({"per_page": "25"});
        let validated = validate_pagination(params.as_object().unwrap()).unwrap();
        assert_eq!(validated.per_page, Some(25));
        assert_eq!(validated.page, None);

        let empty = json!({});
        assert!(validate_pagination(empty.as_object().unwrap())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn pagination_rejects_non_numeric() {
        let params = json!({"page": "abc"});
        assert!(validate_pagination(params.as_object().unwrap()).is_err());
        let params = json!({"per_page": true});
        assert!(validate_pagination(params.as_object().unwrap()).is_err());
    }

    #[test]
    fn enum_list_checks_every_element() {
        let allowed = ["owner", "collaborator", "organization_member"];
        assert!(validate_enum_list("owner,collaborator", &allowed, "bad").is_ok());
        assert!(validate_enum_list("owner, collaborator", &allowed, "bad").is_ok());
        assert_eq!(
            validate_enum_list("owner,admin", &allowed, "Invalid affiliation value").unwrap_err(),
            "Invalid affiliation value"
        );
    }

    #[test]
    fn sanitizer_strips_script_blocks() {
        let input = "Hello <script>alert(1)</script>world";
        let output = sanitize_markdown(input);
        assert!(!output.contains("<script>"));
        assert!(!output.contains("alert(1)"));
        assert!(output.contains("Hello"));
        assert!(output.contains("world"));
    }

    #[test]
    fn sanitizer_strips_dangerous_embeds_and_uris() {
        let input = "a<iframe src=\"x\">inner</iframe>b<embed>c</embed>d \
                     <a href=\"javascript:alert(1)\">link</a> <img onerror=alert(1)>";
        let output = sanitize_markdown(input);
        assert!(!output.contains("<iframe"));
        assert!(!output.contains("<embed"));
        assert!(!output.contains("javascript:"));
        assert!(!output.contains("onerror="));
    }

    #[test]
    fn sanitizer_truncates_to_max_length() {
        let input = "x".repeat(MARKDOWN_MAX_LENGTH + 500);
        let output = sanitize_markdown(&input);
        assert_eq!(output.chars().count(), MARKDOWN_MAX_LENGTH);
    }

    #[test]
    fn sanitizer_trims_whitespace() {
        assert_eq!(sanitize_markdown("  # Notes  "), "# Notes");
        assert_eq!(sanitize_markdown(""), "");
    }
}
