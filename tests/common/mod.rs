//! Shared test fixtures

#![allow(dead_code)]

pub mod mock_executor;
pub mod mock_platform;
pub mod mock_prompt;
pub mod temp_git;

pub use mock_executor::MockExecutor;
pub use mock_platform::{MockPlatformFactory, MockPlatformService};
pub use mock_prompt::ScriptedPrompter;
pub use temp_git::{GITHUB_URL, TempGitRepo};

use async_trait::async_trait;
use make_version::progress::ProgressCallback;
use make_version::types::{MergeOutcome, PlatformConfig, PullRequestRef, ReleaseVersion};
use std::sync::Mutex;

/// Config matching [`GITHUB_URL`]
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        host: None,
    }
}

/// Build a pull request reference
pub fn make_pr(number: u64, head: &str, title: &str) -> PullRequestRef {
    PullRequestRef {
        number,
        head_ref: head.to_string(),
        title: title.to_string(),
    }
}

/// Parse a version, panicking on bad input
pub fn version(s: &str) -> ReleaseVersion {
    s.parse().expect("valid version")
}

/// Progress sink that records everything
#[derive(Default)]
pub struct RecordingProgress {
    pub messages: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
    pub outcomes: Mutex<Vec<(String, MergeOutcome)>>,
    pub waits: Mutex<Vec<String>>,
}

impl RecordingProgress {
    /// Recorded outcomes
    pub fn outcomes(&self) -> Vec<(String, MergeOutcome)> {
        self.outcomes.lock().unwrap().clone()
    }

    /// Recorded warnings
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    async fn on_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    async fn on_merge_outcome(&self, branch: &str, outcome: MergeOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .push((branch.to_string(), outcome));
    }

    async fn on_wait_start(&self, message: &str) {
        self.waits.lock().unwrap().push(format!("start: {message}"));
    }

    async fn on_wait_end(&self, message: &str) {
        self.waits.lock().unwrap().push(format!("end: {message}"));
    }
}
