//! Hosting platform services
//!
//! Provides the interface the release pipeline uses to talk to GitHub.

mod detection;
mod factory;
mod github;

pub use detection::parse_repo_info;
pub use factory::{GitHubFactory, PlatformFactory};
pub use github::{GitHubService, api_base_for_host};

use crate::error::Result;
use crate::types::{PlatformConfig, PullRequestRef, ReleaseInfo, ReleaseRequest};
use async_trait::async_trait;

/// Platform service trait for release operations
///
/// Abstracts the four remote capabilities the release pipeline needs.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Numbers of all open issues carrying `label`
    async fn list_issues_by_label(&self, label: &str) -> Result<Vec<u64>>;

    /// Resolve an issue number to its pull request
    async fn get_pull_request(&self, number: u64) -> Result<PullRequestRef>;

    /// Whether `branch` exists on the remote.
    ///
    /// Implementations report lookup failures as `false`.
    async fn branch_exists(&self, branch: &str) -> Result<bool>;

    /// Create a release record for an already pushed tag
    async fn create_release(&self, request: &ReleaseRequest) -> Result<ReleaseInfo>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
