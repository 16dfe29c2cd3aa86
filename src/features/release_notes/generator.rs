//! Pure commit classification and markdown formatting. Same input, same
//! output, byte for byte.

use crate::features::release_notes::models::{CategorizedCommits, Commit};
use crate::shared::constants::SHORT_SHA_LENGTH;

/// Classify commits by message, case-insensitively. First matching rule
/// wins: the `feat`/`feature` and `fix` prefix checks run BEFORE the
/// "breaking change" content check, so a commit like
/// "feat: drop v1 API (breaking change)" counts as a feature. That ordering
/// is deliberate and load-bearing; reordering it reshuffles existing
/// changelogs.
pub fn categorize(commits: Vec<Commit>) -> CategorizedCommits {
    let mut categorized = CategorizedCommits::default();

    for commit in commits {
        let message = commit.message.to_lowercase();
        if message.starts_with("feat") || message.starts_with("feature") {
            categorized.features.push(commit);
        } else if message.starts_with("fix") {
            categorized.fixes.push(commit);
        } else if message.contains("breaking change") {
            categorized.breaking_changes.push(commit);
        } else {
            categorized.others.push(commit);
        }
    }

    categorized
}

/// Render categorized commits as a markdown document: a heading with the
/// ref range, one section per non-empty category in fixed order, and a
/// full-changelog comparison link.
pub fn generate_markdown(
    categorized: &CategorizedCommits,
    repo_url: &str,
    start_ref: &str,
    end_ref: &str,
) -> String {
    let mut markdown = format!("## Release Notes ({}...{})\n\n", start_ref, end_ref);

    markdown.push_str(&section("🚀 Features", &categorized.features));
    markdown.push_str(&section("🐛 Bug Fixes", &categorized.fixes));
    markdown.push_str(&section("⚠️ Breaking Changes", &categorized.breaking_changes));
    markdown.push_str(&section("📝 Other Commits", &categorized.others));

    markdown.push_str(&format!(
        "\n**Full Changelog**: {}/compare/{}...{}\n",
        repo_url, start_ref, end_ref
    ));

    markdown
}

/// One category section; empty categories produce no heading at all.
fn section(title: &str, commits: &[Commit]) -> String {
    if commits.is_empty() {
        return String::new();
    }

    let mut section = format!("### {}\n\n", title);
    for commit in commits {
        let first_line = commit.message.lines().next().unwrap_or("");
        let short_sha: String = commit.sha.chars().take(SHORT_SHA_LENGTH).collect();
        section.push_str(&format!(
            "- {} ([{}]({}))\n",
            first_line, short_sha, commit.url
        ));
    }
    section.push('\n');
    section
}

#[cfg(test)]
mod tests {
    use fake::faker::name::en::Name;
    use fake::Fake;

    use super::*;

    fn commit(sha: &str, message: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: message.to_string(),
            author_name: Name().fake(),
            author_date: None,
            url: format!("https://github.com/o/r/commit/{}", sha),
        }
    }

    #[test]
    fn classifies_by_message_prefix() {
        let categorized = categorize(vec![
            commit("a1", "feat: add X"),
            commit("b2", "fix: bug"),
            commit("c3", "chore: cleanup, breaking change: remove Y"),
            commit("d4", "docs: update"),
            commit("e5", "Feature: uppercase prefix"),
            commit("f6", "FIX typo"),
        ]);

        assert_eq!(categorized.features.len(), 2);
        assert_eq!(categorized.fixes.len(), 2);
        assert_eq!(categorized.breaking_changes.len(), 1);
        assert_eq!(categorized.others.len(), 1);
    }

    #[test]
    fn prefix_wins_over_breaking_change_content() {
        // Documented precedence: the prefix checks fire first.
        let categorized = categorize(vec![commit("a1", "feat: drop v1 API (breaking change)")]);
        assert_eq!(categorized.features.len(), 1);
        assert!(categorized.breaking_changes.is_empty());

        let categorized = categorize(vec![commit("a1", "refactor: breaking change in config")]);
        assert_eq!(categorized.breaking_changes.len(), 1);
    }

    #[test]
    fn categorize_is_a_total_partition() {
        let commits: Vec<Commit> = (0..50)
            .map(|i| {
                let message = match i % 5 {
                    0 => format!("feat: item {}", i),
                    1 => format!("fix: item {}", i),
                    2 => format!("chore: breaking change {}", i),
                    3 => format!("docs: item {}", i),
                    _ => format!("refactor: item {}", i),
                };
                commit(&format!("sha{}", i), &message)
            })
            .collect();
        let n = commits.len();

        let categorized = categorize(commits);
        assert_eq!(categorized.total(), n);
    }

    #[test]
    fn formatting_is_deterministic() {
        let categorized = categorize(vec![
            commit("0123456789abcdef", "feat: add tags endpoint"),
            commit("fedcba9876543210", "fix: empty ref handling"),
        ]);

        let first = generate_markdown(&categorized, "https://github.com/o/r", "v1.0.0", "v2.0.0");
        let second = generate_markdown(&categorized, "https://github.com/o/r", "v1.0.0", "v2.0.0");
        assert_eq!(first, second);

        assert!(first.starts_with("## Release Notes (v1.0.0...v2.0.0)\n\n"));
        assert!(first.contains("### 🚀 Features\n\n- feat: add tags endpoint ([0123456](https://github.com/o/r/commit/0123456789abcdef))\n"));
        assert!(first.contains("### 🐛 Bug Fixes\n"));
        assert!(first
            .ends_with("**Full Changelog**: https://github.com/o/r/compare/v1.0.0...v2.0.0\n"));
    }

    #[test]
    fn empty_categories_emit_no_heading() {
        let categorized = categorize(vec![commit("a1", "docs: update readme")]);
        let markdown = generate_markdown(&categorized, "https://github.com/o/r", "v1", "v2");

        assert!(!markdown.contains("### 🚀 Features"));
        assert!(!markdown.contains("### 🐛 Bug Fixes"));
        assert!(!markdown.contains("### ⚠️ Breaking Changes"));
        assert!(markdown.contains("### 📝 Other Commits"));
    }

    #[test]
    fn entries_use_only_the_first_message_line() {
        let categorized = categorize(vec![commit(
            "a1b2c3d4e5",
            "feat: add pagination\n\nLong body describing the change.",
        )]);
        let markdown = generate_markdown(&categorized, "https://github.com/o/r", "v1", "v2");

        assert!(markdown.contains("- feat: add pagination ([a1b2c3d]"));
        assert!(!markdown.contains("Long body"));
    }
}
