//! Progress reporting hooks

use crate::types::MergeOutcome;
use async_trait::async_trait;

/// Receives progress updates from the release flow
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Informational status line
    async fn on_message(&self, message: &str);

    /// Something went wrong but the release continues
    async fn on_warning(&self, message: &str);

    /// A candidate branch reached its terminal state
    async fn on_merge_outcome(&self, branch: &str, outcome: MergeOutcome);

    /// A potentially slow wait begins (fetch, settling delay)
    async fn on_wait_start(&self, message: &str);

    /// The current wait finished
    async fn on_wait_end(&self, message: &str);
}

/// Discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
    async fn on_warning(&self, _message: &str) {}
    async fn on_merge_outcome(&self, _branch: &str, _outcome: MergeOutcome) {}
    async fn on_wait_start(&self, _message: &str) {}
    async fn on_wait_end(&self, _message: &str) {}
}
