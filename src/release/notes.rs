//! Release text: notes body, titles and the final recap

use crate::types::{PullRequestRef, ReleaseVersion};
use chrono::NaiveDate;

/// Date format used in release names and tag messages
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Markdown body of the published release.
///
/// Lists every planned pull request and, when some branches conflicted and
/// were skipped, a `Merge Conflicts` section naming them.
pub fn build_release_body(pull_requests: &[PullRequestRef], failed_branches: &[String]) -> String {
    let content = pull_requests
        .iter()
        .map(|pr| format!("- {}: {}", pr.head_ref, pr.title))
        .collect::<Vec<_>>()
        .join("\n");

    let mut body = format!("Content:\n{content}");

    if !failed_branches.is_empty() {
        let conflicts = failed_branches
            .iter()
            .map(|b| format!("- {b}"))
            .collect::<Vec<_>>()
            .join("\n");
        body.push_str("\n\n\nMerge Conflicts:\n");
        body.push_str(&conflicts);
    }

    body
}

/// Title of the published release
pub fn release_name(date: NaiveDate) -> String {
    format!("Release {}", date.format(DATE_FORMAT))
}

/// Annotation of the release tag
pub fn tag_message(username: &str, date: NaiveDate) -> String {
    format!("Release by {username} on {}", date.format(DATE_FORMAT))
}

/// Summary printed once the release is done
pub fn recap(version: &ReleaseVersion, body: &str) -> String {
    format!("Version {version}\n{body}")
}
