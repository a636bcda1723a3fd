//! Merge planning - resolving the ordered list of branches to merge
//!
//! Fetching the labeled pull requests is effectful; turning them into a plan
//! is a pure function so ordering rules can be tested without any I/O.

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::PullRequestRef;
use std::collections::HashSet;
use tracing::debug;

/// Why a branch is part of the merge train
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    /// The release branch as it exists on the remote (earlier runs)
    PreviousRelease,
    /// The integration trunk
    Trunk,
    /// Head branch of a labeled pull request
    PullRequest {
        /// PR number
        number: u64,
        /// PR title
        title: String,
    },
}

/// A branch to merge, in plan order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// Branch name on the remote
    pub branch: String,
    /// Where the candidate came from
    pub kind: CandidateKind,
}

impl std::fmt::Display for MergeCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            CandidateKind::PreviousRelease => write!(f, "{} (previous release)", self.branch),
            CandidateKind::Trunk => write!(f, "{} (trunk)", self.branch),
            CandidateKind::PullRequest { number, title } => {
                write!(f, "{} (PR #{number}: {title})", self.branch)
            }
        }
    }
}

/// Options for merge planning
#[derive(Debug, Clone)]
pub struct MergePlanOptions {
    /// Release branch the candidates are merged into
    pub release_branch: String,
    /// Trunk branch name
    pub trunk: String,
    /// Rebuild the release branch from trunk instead of continuing it
    pub clear_release_branch: bool,
}

/// Ordered merge candidates
///
/// Created by `create_merge_plan()` (pure) and executed by
/// `execute_merge()` (effectful).
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    /// Branches to merge, in order
    pub candidates: Vec<MergeCandidate>,
    /// Pull requests behind the feature candidates (for release notes)
    pub pull_requests: Vec<PullRequestRef>,
}

impl MergePlan {
    /// Branch names in merge order
    pub fn branch_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.branch.as_str()).collect()
    }

    /// Number of pull request branches in the plan
    #[must_use]
    pub fn pull_request_count(&self) -> usize {
        self.pull_requests.len()
    }
}

/// Look up every open pull request labeled `label`
pub async fn fetch_labeled_pull_requests(
    platform: &dyn PlatformService,
    label: &str,
) -> Result<Vec<PullRequestRef>> {
    let numbers = platform.list_issues_by_label(label).await?;
    let mut prs = Vec::with_capacity(numbers.len());

    for number in numbers {
        prs.push(platform.get_pull_request(number).await?);
    }

    debug!(label, count = prs.len(), "resolved labeled pull requests");
    Ok(prs)
}

/// Create a merge plan (PURE - no I/O, easily testable)
///
/// Order is `[release branch (unless clearing), trunk, ...PR heads]`. A
/// branch listed twice is merged once, at its first position.
#[must_use]
pub fn create_merge_plan(prs: &[PullRequestRef], options: &MergePlanOptions) -> MergePlan {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    let mut pull_requests = Vec::new();

    if !options.clear_release_branch {
        seen.insert(options.release_branch.clone());
        candidates.push(MergeCandidate {
            branch: options.release_branch.clone(),
            kind: CandidateKind::PreviousRelease,
        });
    }

    if seen.insert(options.trunk.clone()) {
        candidates.push(MergeCandidate {
            branch: options.trunk.clone(),
            kind: CandidateKind::Trunk,
        });
    }

    for pr in prs {
        if !seen.insert(pr.head_ref.clone()) {
            debug!(branch = %pr.head_ref, pr = pr.number, "branch already planned, skipping duplicate");
            continue;
        }
        candidates.push(MergeCandidate {
            branch: pr.head_ref.clone(),
            kind: CandidateKind::PullRequest {
                number: pr.number,
                title: pr.title.clone(),
            },
        });
        pull_requests.push(pr.clone());
    }

    MergePlan {
        candidates,
        pull_requests,
    }
}
