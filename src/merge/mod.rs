//! Merge train for release branches
//!
//! Three-phase pattern:
//! 1. Gather - fetch labeled pull requests (effectful, bounded)
//! 2. Plan - create `MergePlan` (pure, testable)
//! 3. Execute - merge each candidate into the release branch (effectful)

mod execute;
mod plan;

pub use execute::{
    MergeDeps, MergeExecutionResult, MergeSettings, execute_merge, merge_commit_message,
};
pub use plan::{
    CandidateKind, MergeCandidate, MergePlan, MergePlanOptions, create_merge_plan,
    fetch_labeled_pull_requests,
};
