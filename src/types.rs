//! Core types for make-version

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Pattern a release version must match: ASCII digits, no leading zeros
pub const VERSION_PATTERN: &str = r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)$";

/// Label used to select issues when none is configured
pub const DEFAULT_LABEL: &str = "readyForMerge";

/// Integration branch every release starts from
pub const DEFAULT_TRUNK: &str = "master";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VERSION_PATTERN).expect("version pattern is valid"));

/// A `major.minor.patch` release version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseVersion {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
}

impl ReleaseVersion {
    /// Name of the release branch this version is merged into.
    ///
    /// Only major and minor participate, so `2.3.0` and `2.3.1` share
    /// `release_2.3` and a re-run picks up where the previous one left off.
    pub fn release_branch(&self) -> String {
        format!("release_{}.{}", self.major, self.minor)
    }

    /// Tag name for this version
    pub fn tag_name(&self) -> String {
        self.to_string()
    }
}

impl FromStr for ReleaseVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if !VERSION_RE.is_match(trimmed) {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        let parts = trimmed
            .split('.')
            .map(str::parse::<u64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidVersion(s.to_string()))?;
        let [major, minor, patch] = parts[..] else {
            return Err(Error::InvalidVersion(s.to_string()));
        };

        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Hosting credentials, passed through to the API client and commit messages
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// GitHub username
    pub username: String,
    /// Password or personal access token
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A pull request linked to a labeled issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// PR number (same as the issue number)
    pub number: u64,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
}

/// A git remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Platform configuration for the hosting API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

/// Release to publish on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Tag the release points at
    pub tag_name: String,
    /// Branch the tag was created on
    pub target_branch: String,
    /// Release title
    pub name: String,
    /// Markdown body
    pub body: String,
    /// Whether the release is marked as a prerelease
    pub prerelease: bool,
}

/// Release returned by the hosting platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Release ID
    pub id: u64,
    /// Web URL for the release
    pub html_url: String,
}

/// What to do when a merge conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Show the diff and ask the operator to resolve or abort
    #[default]
    Interactive,
    /// Abort the merge, record the branch and move on
    Skip,
}

/// Operator answer to the conflict prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Conflict resolved in the working tree, commit and continue
    Resolved,
    /// Abandon the whole release
    Abort,
}

impl FromStr for ConflictResolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "yes" => Ok(Self::Resolved),
            "no" => Ok(Self::Abort),
            other => Err(Error::Prompt(format!(
                "expected 'yes' or 'no', got '{other}'"
            ))),
        }
    }
}

/// Terminal state of a single candidate branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merged and committed
    Merged,
    /// Branch does not exist on the remote
    SkippedNoSuchBranch,
    /// Merge conflicted and was aborted under the skip policy
    SkippedConflict,
    /// Operator abandoned the release
    Aborted,
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::SkippedNoSuchBranch => write!(f, "skipped (no such branch)"),
            Self::SkippedConflict => write!(f, "skipped (merge conflict)"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}
