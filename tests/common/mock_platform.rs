//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use make_version::error::{Error, Result};
use make_version::platform::{PlatformFactory, PlatformService};
use make_version::types::{
    Credentials, PlatformConfig, PullRequestRef, ReleaseInfo, ReleaseRequest,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Simple mock platform service for testing
///
/// This manually implements `PlatformService` rather than using a mocking
/// framework.
///
/// Features:
/// - Labeled issues and their pull requests
/// - A set of branches that "exist on the remote"
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_release_id: AtomicU64,
    labeled: Mutex<HashMap<String, Vec<u64>>>,
    pull_requests: Mutex<HashMap<u64, PullRequestRef>>,
    branches: Mutex<HashSet<String>>,
    // Call tracking
    list_issues_calls: Mutex<Vec<String>>,
    get_pr_calls: Mutex<Vec<u64>>,
    branch_exists_calls: Mutex<Vec<String>>,
    create_release_calls: Mutex<Vec<ReleaseRequest>>,
    // Error injection
    error_on_list_issues: Mutex<Option<String>>,
    error_on_branch_exists: Mutex<Option<String>>,
    error_on_create_release: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_release_id: AtomicU64::new(1),
            labeled: Mutex::new(HashMap::new()),
            pull_requests: Mutex::new(HashMap::new()),
            branches: Mutex::new(HashSet::new()),
            list_issues_calls: Mutex::new(Vec::new()),
            get_pr_calls: Mutex::new(Vec::new()),
            branch_exists_calls: Mutex::new(Vec::new()),
            create_release_calls: Mutex::new(Vec::new()),
            error_on_list_issues: Mutex::new(None),
            error_on_branch_exists: Mutex::new(None),
            error_on_create_release: Mutex::new(None),
        }
    }

    // === Setup ===

    /// Label a pull request; its head branch is registered as existing
    pub fn add_labeled_pr(&self, label: &str, pr: PullRequestRef) {
        self.labeled
            .lock()
            .unwrap()
            .entry(label.to_string())
            .or_default()
            .push(pr.number);
        self.branches.lock().unwrap().insert(pr.head_ref.clone());
        self.pull_requests.lock().unwrap().insert(pr.number, pr);
    }

    /// Register branches as existing on the remote
    pub fn add_branches(&self, names: &[&str]) {
        let mut branches = self.branches.lock().unwrap();
        for name in names {
            branches.insert((*name).to_string());
        }
    }

    /// Forget a branch
    pub fn remove_branch(&self, name: &str) {
        self.branches.lock().unwrap().remove(name);
    }

    // === Error injection methods ===

    /// Make `list_issues_by_label` return an error
    pub fn fail_list_issues(&self, msg: &str) {
        *self.error_on_list_issues.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `branch_exists` return an error
    pub fn fail_branch_exists(&self, msg: &str) {
        *self.error_on_branch_exists.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_release` return an error
    pub fn fail_create_release(&self, msg: &str) {
        *self.error_on_create_release.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// Labels `list_issues_by_label` was called with
    pub fn get_list_issues_calls(&self) -> Vec<String> {
        self.list_issues_calls.lock().unwrap().clone()
    }

    /// Numbers `get_pull_request` was called with
    pub fn get_pr_calls(&self) -> Vec<u64> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// Branches `branch_exists` was called with
    pub fn get_branch_exists_calls(&self) -> Vec<String> {
        self.branch_exists_calls.lock().unwrap().clone()
    }

    /// All `create_release` requests
    pub fn get_create_release_calls(&self) -> Vec<ReleaseRequest> {
        self.create_release_calls.lock().unwrap().clone()
    }

    /// Assert that a release was requested for `tag` on `branch`
    pub fn assert_release_created(&self, tag: &str, branch: &str) {
        let calls = self.get_create_release_calls();
        assert!(
            calls
                .iter()
                .any(|c| c.tag_name == tag && c.target_branch == branch && c.prerelease),
            "Expected create_release({tag}, {branch}) but got: {calls:?}"
        );
    }

    /// Assert that no release was requested
    pub fn assert_no_release_created(&self) {
        let calls = self.get_create_release_calls();
        assert!(
            calls.is_empty(),
            "Expected no create_release call but got: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_issues_by_label(&self, label: &str) -> Result<Vec<u64>> {
        self.list_issues_calls
            .lock()
            .unwrap()
            .push(label.to_string());

        // Check for injected error
        if let Some(msg) = self.error_on_list_issues.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let labeled = self.labeled.lock().unwrap();
        Ok(labeled.get(label).cloned().unwrap_or_default())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequestRef> {
        self.get_pr_calls.lock().unwrap().push(number);

        let prs = self.pull_requests.lock().unwrap();
        prs.get(&number).cloned().ok_or_else(|| {
            Error::GitHubApi(format!(
                "get_pull_request: no response configured for #{number}"
            ))
        })
    }

    async fn branch_exists(&self, branch: &str) -> Result<bool> {
        self.branch_exists_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        // Check for injected error
        if let Some(msg) = self.error_on_branch_exists.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        Ok(self.branches.lock().unwrap().contains(branch))
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<ReleaseInfo> {
        self.create_release_calls
            .lock()
            .unwrap()
            .push(request.clone());

        // Check for injected error
        if let Some(msg) = self.error_on_create_release.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let id = self.next_release_id.fetch_add(1, Ordering::SeqCst);
        Ok(ReleaseInfo {
            id,
            html_url: format!(
                "https://github.com/{}/{}/releases/tag/{}",
                self.config.owner, self.config.repo, request.tag_name
            ),
        })
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

/// Factory handing out a shared [`MockPlatformService`]
pub struct MockPlatformFactory {
    service: Arc<MockPlatformService>,
    created_for: Mutex<Vec<PlatformConfig>>,
    credentials_seen: Mutex<Vec<String>>,
}

impl MockPlatformFactory {
    /// Wrap a mock service
    pub fn new(service: Arc<MockPlatformService>) -> Self {
        Self {
            service,
            created_for: Mutex::new(Vec::new()),
            credentials_seen: Mutex::new(Vec::new()),
        }
    }

    /// Configs `create` was called with
    pub fn get_created_for(&self) -> Vec<PlatformConfig> {
        self.created_for.lock().unwrap().clone()
    }

    /// Usernames `create` was called with
    pub fn get_usernames(&self) -> Vec<String> {
        self.credentials_seen.lock().unwrap().clone()
    }
}

impl PlatformFactory for MockPlatformFactory {
    fn create(
        &self,
        config: &PlatformConfig,
        credentials: &Credentials,
        _timeout: Duration,
    ) -> Result<Arc<dyn PlatformService>> {
        self.created_for.lock().unwrap().push(config.clone());
        self.credentials_seen
            .lock()
            .unwrap()
            .push(credentials.username.clone());
        Ok(self.service.clone())
    }
}
