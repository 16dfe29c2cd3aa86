//! The proxy's allow-list of upstream operations.
//!
//! Each supported endpoint name maps to one [`ProxyOperation`] variant and
//! a dedicated parameter validator; adding an operation means adding a
//! variant and a table entry, not another branch in the handler.

use serde_json::{Map, Value};

use crate::shared::validation::{
    validate_enum, validate_enum_list, validate_owner, validate_pagination, validate_ref,
    validate_repo_name, Pagination,
};

const VALID_VISIBILITIES: [&str; 3] = ["all", "public", "private"];
const VALID_AFFILIATIONS: [&str; 3] = ["owner", "collaborator", "organization_member"];
const VALID_TYPES: [&str; 5] = ["all", "owner", "public", "private", "member"];
const VALID_SORTS: [&str; 4] = ["created", "updated", "pushed", "full_name"];
const VALID_DIRECTIONS: [&str; 2] = ["asc", "desc"];

/// A validated upstream operation, ready to be executed by the GitHub
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOperation {
    ListTags {
        owner: String,
        repo: String,
        pagination: Pagination,
    },
    CompareCommits {
        owner: String,
        repo: String,
        base: String,
        head: String,
    },
    ListForAuthenticatedUser {
        visibility: Option<String>,
        affiliation: Option<String>,
        repo_type: Option<String>,
        sort: Option<String>,
        direction: Option<String>,
        pagination: Pagination,
    },
    GetRepo {
        owner: String,
        repo: String,
    },
}

impl ProxyOperation {
    /// Parse and validate a requested endpoint against the allow-list.
    /// Unknown names are rejected outright.
    pub fn from_request(endpoint: &str, params: &Map<String, Value>) -> Result<Self, String> {
        match endpoint {
            "repos.listTags" => validate_list_tags(params),
            "repos.compareCommits" => validate_compare_commits(params),
            "repos.listForAuthenticatedUser" => validate_list_for_authenticated_user(params),
            "repos.get" => validate_get_repo(params),
            _ => Err("Unsupported endpoint".to_string()),
        }
    }

    pub fn endpoint_name(&self) -> &'static str {
        match self {
            ProxyOperation::ListTags { .. } => "repos.listTags",
            ProxyOperation::CompareCommits { .. } => "repos.compareCommits",
            ProxyOperation::ListForAuthenticatedUser { .. } => "repos.listForAuthenticatedUser",
            ProxyOperation::GetRepo { .. } => "repos.get",
        }
    }
}

/// Required string parameter; anything absent or non-string becomes the
/// empty string so the field validator produces its "required" error.
fn str_param<'a>(params: &'a Map<String, Value>, key: &str) -> &'a str {
    params.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

/// Optional enum-ish parameter. Present-but-empty counts as absent; a
/// non-string value fails with the field's own error message.
fn optional_str_param<'a>(
    params: &'a Map<String, Value>,
    key: &str,
    error: &str,
) -> Result<Option<&'a str>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(error.to_string()),
    }
}

fn validate_list_tags(params: &Map<String, Value>) -> Result<ProxyOperation, String> {
    let owner = validate_owner(str_param(params, "owner"))?;
    let repo = validate_repo_name(str_param(params, "repo"))?;
    let pagination = validate_pagination(params)?;

    Ok(ProxyOperation::ListTags {
        owner,
        repo,
        pagination,
    })
}

fn validate_compare_commits(params: &Map<String, Value>) -> Result<ProxyOperation, String> {
    let owner = validate_owner(str_param(params, "owner"))?;
    let repo = validate_repo_name(str_param(params, "repo"))?;
    let base = validate_ref(str_param(params, "base")).map_err(|e| format!("Base {}", e))?;
    let head = validate_ref(str_param(params, "head")).map_err(|e| format!("Head {}", e))?;

    Ok(ProxyOperation::CompareCommits {
        owner,
        repo,
        base,
        head,
    })
}

fn validate_list_for_authenticated_user(
    params: &Map<String, Value>,
) -> Result<ProxyOperation, String> {
    let visibility_error = "visibility must be one of: all, public, private";
    let visibility = optional_str_param(params, "visibility", visibility_error)?
        .map(|v| validate_enum(v, &VALID_VISIBILITIES, visibility_error))
        .transpose()?;

    let affiliation_error = "Invalid affiliation value";
    let affiliation = optional_str_param(params, "affiliation", affiliation_error)?
        .map(|v| validate_enum_list(v, &VALID_AFFILIATIONS, affiliation_error))
        .transpose()?;

    let type_error = "Invalid type value";
    let repo_type = optional_str_param(params, "type", type_error)?
        .map(|v| validate_enum(v, &VALID_TYPES, type_error))
        .transpose()?;

    let sort_error = "Invalid sort value";
    let sort = optional_str_param(params, "sort", sort_error)?
        .map(|v| validate_enum(v, &VALID_SORTS, sort_error))
        .transpose()?;

    let direction_error = "direction must be asc or desc";
    let direction = optional_str_param(params, "direction", direction_error)?
        .map(|v| validate_enum(v, &VALID_DIRECTIONS, direction_error))
        .transpose()?;

    let pagination = validate_pagination(params)?;

    Ok(ProxyOperation::ListForAuthenticatedUser {
        visibility,
        affiliation,
        repo_type,
        sort,
        direction,
        pagination,
    })
}

fn validate_get_repo(params: &Map<String, Value>) -> Result<ProxyOperation, String> {
    let owner = validate_owner(str_param(params, "owner"))?;
    let repo = validate_repo_name(str_param(params, "repo"))?;

    Ok(ProxyOperation::GetRepo { owner, repo })
}
