//! Run options and the optional `.make-version.toml` file.
//!
//! Precedence is command line (and environment) first, then the file in the
//! repository root, then built-in defaults.

use crate::error::{Error, Result};
use crate::types::{ConflictPolicy, DEFAULT_TRUNK};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Filename looked up in the repository root.
pub const CONFIG_FILE: &str = ".make-version.toml";

/// Wait between pushing and creating the release.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Upper bound for a single API request.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(5);

/// Log filter used when `RUST_LOG` is unset.
///
/// `--silent` keeps warnings and errors only, which hides the per-command
/// `SUCCESS`/`ERROR` lines.
pub fn default_log_filter(silent: bool) -> &'static str {
    if silent {
        "warn"
    } else {
        "make_version=info,warn"
    }
}

/// Contents of `.make-version.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Issue label selecting pull requests
    pub label: Option<String>,
    /// Trunk branch name
    pub trunk: Option<String>,
    /// Remote to fetch from and push to
    pub remote: Option<String>,
    /// Skip conflicting branches instead of asking
    pub skip_merge_conflict: Option<bool>,
    /// Settling delay in milliseconds
    pub settle_delay_ms: Option<u64>,
    /// API request timeout in milliseconds
    pub api_timeout_ms: Option<u64>,
    /// GitHub Enterprise API host
    pub api_host: Option<String>,
}

/// Get path to the config file for a repository.
pub fn config_path(repository: &Path) -> PathBuf {
    repository.join(CONFIG_FILE)
}

/// Load the config file.
///
/// Returns the default (empty) config if the file doesn't exist.
pub fn load_config(repository: &Path) -> Result<FileConfig> {
    let path = config_path(repository);

    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--username`
    pub username: Option<String>,
    /// `--password` / `GITHUB_TOKEN`
    pub password: Option<String>,
    /// `--label`
    pub label: Option<String>,
    /// `--build`
    pub version: Option<String>,
    /// `--skip-merge-conflict`
    pub skip_merge_conflict: bool,
    /// `--clear`
    pub clear_release_branch: bool,
    /// `--silent`
    pub silent: bool,
    /// `--trunk`
    pub trunk: Option<String>,
    /// `--remote`
    pub remote: Option<String>,
    /// `--api-host`
    pub api_host: Option<String>,
}

/// Fully resolved options for one release run
#[derive(Clone)]
pub struct ReleaseOptions {
    /// GitHub username (asked for when missing)
    pub username: Option<String>,
    /// Password or token (asked for when missing)
    pub password: Option<String>,
    /// Issue label (asked for when missing)
    pub label: Option<String>,
    /// Version to release (asked for when missing)
    pub version: Option<String>,
    /// Absolute path of the working copy
    pub repository_path: PathBuf,
    /// Skip conflicting branches instead of asking
    pub skip_merge_conflict: bool,
    /// Rebuild the release branch from trunk
    pub clear_release_branch: bool,
    /// Only print warnings, errors and the recap
    pub silent: bool,
    /// Trunk branch name
    pub trunk: String,
    /// Remote to use (`origin`, else the first one, when unset)
    pub remote: Option<String>,
    /// Wait between pushing and creating the release
    pub settle_delay: Duration,
    /// Upper bound for a single API request
    pub api_timeout: Duration,
    /// GitHub Enterprise API host
    pub api_host: Option<String>,
}

impl std::fmt::Debug for ReleaseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseOptions")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("label", &self.label)
            .field("version", &self.version)
            .field("repository_path", &self.repository_path)
            .field("skip_merge_conflict", &self.skip_merge_conflict)
            .field("clear_release_branch", &self.clear_release_branch)
            .field("silent", &self.silent)
            .field("trunk", &self.trunk)
            .field("remote", &self.remote)
            .field("settle_delay", &self.settle_delay)
            .field("api_timeout", &self.api_timeout)
            .field("api_host", &self.api_host)
            .finish()
    }
}

impl ReleaseOptions {
    /// Defaults for a repository, with nothing supplied
    pub fn new(repository_path: impl Into<PathBuf>) -> Self {
        Self {
            username: None,
            password: None,
            label: None,
            version: None,
            repository_path: repository_path.into(),
            skip_merge_conflict: false,
            clear_release_branch: false,
            silent: false,
            trunk: DEFAULT_TRUNK.to_string(),
            remote: None,
            settle_delay: DEFAULT_SETTLE_DELAY,
            api_timeout: DEFAULT_API_TIMEOUT,
            api_host: None,
        }
    }

    /// Combine command-line values with the config file
    pub fn resolve(
        repository_path: impl Into<PathBuf>,
        cli: CliOverrides,
        file: FileConfig,
    ) -> Self {
        let defaults = Self::new(repository_path);

        Self {
            username: cli.username,
            password: cli.password,
            label: cli.label.or(file.label),
            version: cli.version,
            skip_merge_conflict: cli.skip_merge_conflict
                || file.skip_merge_conflict.unwrap_or(false),
            clear_release_branch: cli.clear_release_branch,
            silent: cli.silent,
            trunk: cli.trunk.or(file.trunk).unwrap_or(defaults.trunk),
            remote: cli.remote.or(file.remote),
            settle_delay: file
                .settle_delay_ms
                .map_or(defaults.settle_delay, Duration::from_millis),
            api_timeout: file
                .api_timeout_ms
                .map_or(defaults.api_timeout, Duration::from_millis),
            api_host: cli.api_host.or(file.api_host),
            repository_path: defaults.repository_path,
        }
    }

    /// Conflict policy implied by the options
    pub const fn conflict_policy(&self) -> ConflictPolicy {
        if self.skip_merge_conflict {
            ConflictPolicy::Skip
        } else {
            ConflictPolicy::Interactive
        }
    }
}
