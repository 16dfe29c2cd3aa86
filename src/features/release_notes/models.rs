use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};

/// A single commit from the upstream comparison, reduced to what note
/// generation needs. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub author_date: Option<DateTime<Utc>>,
    pub url: String,
}

/// Total partition of a commit list: every commit lands in exactly one
/// category.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedCommits {
    pub features: Vec<Commit>,
    pub fixes: Vec<Commit>,
    pub breaking_changes: Vec<Commit>,
    pub others: Vec<Commit>,
}

impl CategorizedCommits {
    pub fn total(&self) -> usize {
        self.features.len() + self.fixes.len() + self.breaking_changes.len() + self.others.len()
    }
}

// Wire shape of the GitHub compare payload.

#[derive(Debug, Deserialize)]
struct ComparePayload {
    #[serde(default)]
    commits: Vec<CompareCommitItem>,
}

#[derive(Debug, Deserialize)]
struct CompareCommitItem {
    sha: String,
    commit: CompareCommitDetails,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompareCommitDetails {
    message: String,
    #[serde(default)]
    author: Option<CompareCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CompareCommitAuthor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

impl From<CompareCommitItem> for Commit {
    fn from(item: CompareCommitItem) -> Self {
        let (author_name, author_date) = match item.commit.author {
            Some(author) => (
                author.name.unwrap_or_else(|| "Unknown author".to_string()),
                author.date,
            ),
            None => ("Unknown author".to_string(), None),
        };

        Commit {
            sha: item.sha,
            message: item.commit.message,
            author_name,
            author_date,
            url: item.html_url.unwrap_or_default(),
        }
    }
}

/// Extract commits from a `repos.compareCommits` response body. An absent
/// commit list (identical refs) is an empty vec, not an error.
pub fn commits_from_compare(data: &serde_json::Value) -> Result<Vec<Commit>> {
    let payload: ComparePayload = serde_json::from_value(data.clone()).map_err(|e| {
        AppError::UpstreamService(format!("Failed to parse comparison payload: {}", e))
    })?;

    Ok(payload.commits.into_iter().map(Commit::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_compare_payload() {
        let data = json!({
            "commits": [
                {
                    "sha": "0123456789abcdef",
                    "commit": {
                        "message": "feat: add tags endpoint",
                        "author": {"name": "Dev One", "date": "2024-03-01T12:00:00Z"}
                    },
                    "html_url": "https://github.com/o/r/commit/0123456"
                },
                {
                    "sha": "fedcba9876543210",
                    "commit": {"message": "fix: handle empty refs"}
                }
            ],
            "total_commits": 2
        });

        let commits = commits_from_compare(&data).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].author_name, "Dev One");
        assert!(commits[0].author_date.is_some());
        assert_eq!(commits[1].author_name, "Unknown author");
        assert_eq!(commits[1].url, "");
    }

    #[test]
    fn missing_commit_list_is_empty() {
        let commits = commits_from_compare(&json!({"status": "identical"})).unwrap();
        assert!(commits.is_empty());
    }

    #[test]
    fn malformed_payload_is_an_upstream_error() {
        let error = commits_from_compare(&json!({"commits": [{"sha": 42}]})).unwrap_err();
        assert!(matches!(error, AppError::UpstreamService(_)));
    }
}
