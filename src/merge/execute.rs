//! Merge execution - effectful operations
//!
//! This module walks a `MergePlan` (created by the pure planning functions)
//! and merges each candidate into the checked-out release branch.

use crate::error::{Error, Result};
use crate::merge::plan::MergePlan;
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::prompt::{Prompter, ask_conflict_resolution};
use crate::repo::GitRepo;
use crate::types::{ConflictPolicy, ConflictResolution, MergeOutcome, ReleaseVersion};
use tracing::debug;

/// Fixed inputs of a merge run
#[derive(Debug, Clone)]
pub struct MergeSettings {
    /// Remote the candidate branches are read from
    pub remote: String,
    /// Version being released (for commit messages)
    pub version: ReleaseVersion,
    /// Operator username (for commit messages)
    pub username: String,
    /// What to do on conflicts
    pub policy: ConflictPolicy,
}

/// Collaborators the merge engine drives
pub struct MergeDeps<'a> {
    /// Working copy, with the release branch checked out
    pub repo: &'a GitRepo,
    /// Branch existence checks
    pub platform: &'a dyn PlatformService,
    /// Conflict questions
    pub prompter: &'a dyn Prompter,
    /// Status updates
    pub progress: &'a dyn ProgressCallback,
}

/// Result of merge execution
#[derive(Debug, Clone, Default)]
pub struct MergeExecutionResult {
    /// Terminal state of every candidate, in plan order
    pub outcomes: Vec<(String, MergeOutcome)>,
    /// Branches that conflicted and were skipped
    pub failed_branches: Vec<String>,
}

impl MergeExecutionResult {
    /// Check if no branch was skipped because of a conflict
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed_branches.is_empty()
    }

    /// Branches that were merged
    pub fn merged(&self) -> Vec<&str> {
        self.with_outcome(MergeOutcome::Merged)
    }

    /// Branches skipped because they do not exist on the remote
    pub fn missing(&self) -> Vec<&str> {
        self.with_outcome(MergeOutcome::SkippedNoSuchBranch)
    }

    fn with_outcome(&self, wanted: MergeOutcome) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == wanted)
            .map(|(branch, _)| branch.as_str())
            .collect()
    }
}

/// Commit message for a merged branch
pub fn merge_commit_message(branch: &str, version: &ReleaseVersion, username: &str) -> String {
    format!("Merge branch \"{branch}\" for release {version} by {username}")
}

/// Execute the merge plan (EFFECTFUL)
///
/// Candidates are processed strictly in order. A branch missing on the
/// remote is skipped without touching the working copy. Conflicts follow
/// `settings.policy`; an operator abort ends the run with
/// [`Error::OperatorAbort`] and leaves cleanup to the caller.
///
/// The working tree never holds an unresolved conflict when this returns
/// `Ok`.
pub async fn execute_merge(
    plan: &MergePlan,
    settings: &MergeSettings,
    deps: &MergeDeps<'_>,
) -> Result<MergeExecutionResult> {
    let mut result = MergeExecutionResult::default();

    for candidate in &plan.candidates {
        let branch = candidate.branch.as_str();
        deps.progress
            .on_message(&format!("Merging {candidate}"))
            .await;

        let outcome = merge_one(branch, settings, deps).await?;
        if outcome == MergeOutcome::SkippedConflict {
            result.failed_branches.push(branch.to_string());
        }

        deps.progress.on_merge_outcome(branch, outcome).await;
        result.outcomes.push((branch.to_string(), outcome));
    }

    Ok(result)
}

async fn merge_one(
    branch: &str,
    settings: &MergeSettings,
    deps: &MergeDeps<'_>,
) -> Result<MergeOutcome> {
    let exists = match deps.platform.branch_exists(branch).await {
        Ok(exists) => exists,
        Err(e) => {
            debug!(branch, error = %e, "branch lookup failed, treating as absent");
            false
        }
    };
    if !exists {
        return Ok(MergeOutcome::SkippedNoSuchBranch);
    }

    let message = merge_commit_message(branch, &settings.version, &settings.username);
    let rev = format!("{}/{branch}", settings.remote);

    if deps.repo.merge_no_commit(&rev).await? {
        deps.repo.commit_all(&message).await?;
        return Ok(MergeOutcome::Merged);
    }

    let diff = deps.repo.diff().await?;

    match settings.policy {
        ConflictPolicy::Skip => {
            deps.repo.merge_abort().await?;
            let conflict = Error::MergeConflict(branch.to_string());
            debug!(error = %conflict, "recovered by skipping");
            deps.progress
                .on_warning(&format!("{conflict}, skipping"))
                .await;
            Ok(MergeOutcome::SkippedConflict)
        }
        ConflictPolicy::Interactive => {
            resolve_interactively(branch, &message, diff, deps).await?;
            Ok(MergeOutcome::Merged)
        }
    }
}

/// Ask the operator until the conflict is committed or the release abandoned
async fn resolve_interactively(
    branch: &str,
    message: &str,
    mut diff: String,
    deps: &MergeDeps<'_>,
) -> Result<()> {
    loop {
        deps.prompter.show(&diff);

        match ask_conflict_resolution(deps.prompter)? {
            ConflictResolution::Abort => {
                deps.progress
                    .on_merge_outcome(branch, MergeOutcome::Aborted)
                    .await;
                return Err(Error::OperatorAbort {
                    branch: branch.to_string(),
                });
            }
            ConflictResolution::Resolved => {
                let unresolved = deps.repo.paths_with_conflict_markers().await?;
                if unresolved.is_empty() {
                    deps.repo.commit_all(message).await?;
                    return Ok(());
                }

                deps.progress
                    .on_warning(&format!(
                        "Conflict markers left in {branch}: {}",
                        unresolved.join(", ")
                    ))
                    .await;
                diff = deps.repo.diff().await?;
            }
        }
    }
}
