//! Error types for make-version

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a release
#[derive(Debug, Error)]
pub enum Error {
    /// Tracked files have uncommitted modifications
    #[error(
        "working tree has modified files, commit or stash them first:\n{}",
        .0.iter().map(|f| format!("\t{f}")).collect::<Vec<_>>().join("\n")
    )]
    DirtyWorkingTree(Vec<String>),

    /// Owner/name could not be derived from the local remote configuration
    #[error("could not resolve repository info: {0}")]
    RepositoryInfoUnresolvable(String),

    /// No remote with a recognizable GitHub URL
    #[error("no supported remote found (expected a GitHub remote)")]
    NoSupportedRemotes,

    /// Requested remote does not exist
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// GitHub API failure
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Merge left conflicting hunks in the working tree
    #[error("merge conflict while merging '{0}'")]
    MergeConflict(String),

    /// Operator answered `no` at a conflict prompt
    #[error("release aborted by operator while resolving conflicts on '{branch}'")]
    OperatorAbort {
        /// Branch that was being merged
        branch: String,
    },

    /// A command exited with a non-zero status
    #[error("command failed: {command}\n{stderr}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// A command could not be started at all
    #[error("failed to run {command}: {source}")]
    CommandSpawn {
        /// Rendered command line
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// Release tag exists but points at a different commit
    #[error("tag '{0}' already exists on a different commit")]
    TagExists(String),

    /// Version does not match `major.minor.patch`
    #[error("invalid version '{0}': expected major.minor.patch (e.g. 2.3.0)")]
    InvalidVersion(String),

    /// Interactive prompt failed (closed stdin, terminal error)
    #[error("prompt error: {0}")]
    Prompt(String),

    /// Configuration file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal invariant violated
    #[error("internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}
