//! Release pipeline - ordered stages with a single rollback path
//!
//! Every stage either completes or returns an error. The first error stops
//! the run and triggers [`ReleasePipeline::rollback`], which undoes local
//! repository changes made by this run. Pushed refs and published releases
//! are not touched.

use crate::config::ReleaseOptions;
use crate::error::{Error, Result};
use crate::merge::{
    MergeDeps, MergeExecutionResult, MergePlan, MergePlanOptions, MergeSettings, create_merge_plan,
    execute_merge, fetch_labeled_pull_requests,
};
use crate::platform::{PlatformFactory, PlatformService, parse_repo_info};
use crate::progress::ProgressCallback;
use crate::prompt::{GatheredInputs, Prompter, gather_inputs};
use crate::release::notes::{build_release_body, recap, release_name, tag_message};
use crate::repo::{GitRepo, select_remote};
use crate::types::{PlatformConfig, ReleaseInfo, ReleaseRequest, ReleaseVersion};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Named pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Refuse to run on a dirty working tree
    Preflight,
    /// Remember the checked-out branch
    SnapshotBranch,
    /// Credentials, version and label
    GatherInputs,
    /// Owner/name from the remote, API client
    ResolveRepository,
    /// Labeled pull requests into a merge plan
    ResolveBranches,
    /// `git fetch --all`
    Fetch,
    /// Create or reuse the release branch
    PrepareReleaseBranch,
    /// Run the merge train
    Merge,
    /// Annotated version tag
    Tag,
    /// Check out the original branch again
    RestoreBranch,
    /// Push release branch and tag
    Push,
    /// Create the GitHub release
    Publish,
    /// Build the final summary
    Recap,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Self; 13] = [
        Self::Preflight,
        Self::SnapshotBranch,
        Self::GatherInputs,
        Self::ResolveRepository,
        Self::ResolveBranches,
        Self::Fetch,
        Self::PrepareReleaseBranch,
        Self::Merge,
        Self::Tag,
        Self::RestoreBranch,
        Self::Push,
        Self::Publish,
        Self::Recap,
    ];

    /// Human-readable stage name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::SnapshotBranch => "snapshot branch",
            Self::GatherInputs => "gather inputs",
            Self::ResolveRepository => "resolve repository",
            Self::ResolveBranches => "resolve branches",
            Self::Fetch => "fetch",
            Self::PrepareReleaseBranch => "prepare release branch",
            Self::Merge => "merge",
            Self::Tag => "tag",
            Self::RestoreBranch => "restore branch",
            Self::Push => "push",
            Self::Publish => "publish",
            Self::Recap => "recap",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable state threaded through the stages
#[derive(Default)]
pub struct ReleaseContext {
    /// Branch checked out before the run
    pub original_branch: Option<String>,
    /// Credentials, version and label
    pub inputs: Option<GatheredInputs>,
    /// Remote used for fetch and push
    pub remote: Option<String>,
    /// Owner/name on the hosting platform
    pub repository: Option<PlatformConfig>,
    /// API client for the repository
    pub platform: Option<Arc<dyn PlatformService>>,
    /// Ordered merge candidates
    pub plan: MergePlan,
    /// Per-branch merge results
    pub merge: MergeExecutionResult,
    /// The release branch was created by this run
    pub created_branch: bool,
    /// Tip of the reused local release branch before this run
    pub previous_release_tip: Option<String>,
    /// The tag was created by this run
    pub created_tag: bool,
    /// Release notes body
    pub body: String,
    /// Published release, if creation succeeded
    pub release: Option<ReleaseInfo>,
    /// Final summary text
    pub recap: String,
}

impl fmt::Debug for ReleaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseContext")
            .field("original_branch", &self.original_branch)
            .field("inputs", &self.inputs)
            .field("remote", &self.remote)
            .field("repository", &self.repository)
            .field("plan", &self.plan)
            .field("created_branch", &self.created_branch)
            .field("previous_release_tip", &self.previous_release_tip)
            .field("created_tag", &self.created_tag)
            .finish_non_exhaustive()
    }
}

impl ReleaseContext {
    fn inputs(&self) -> Result<&GatheredInputs> {
        self.inputs
            .as_ref()
            .ok_or_else(|| Error::Internal("inputs not gathered yet".to_string()))
    }

    fn remote(&self) -> Result<&str> {
        self.remote
            .as_deref()
            .ok_or_else(|| Error::Internal("remote not resolved yet".to_string()))
    }

    fn platform(&self) -> Result<&dyn PlatformService> {
        self.platform
            .as_deref()
            .ok_or_else(|| Error::Internal("platform not resolved yet".to_string()))
    }

    fn original_branch(&self) -> Result<&str> {
        self.original_branch
            .as_deref()
            .ok_or_else(|| Error::Internal("original branch not recorded".to_string()))
    }
}

/// What the rollback did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Steps that succeeded
    pub actions: Vec<String>,
    /// Steps that failed (never escalated)
    pub warnings: Vec<String>,
}

impl RollbackReport {
    /// Whether every rollback step succeeded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn record(&mut self, action: String, result: Result<()>) {
        match result {
            Ok(()) => {
                info!("rolled back: {action}");
                self.actions.push(action);
            }
            Err(e) => {
                warn!("rollback step failed: {action}: {e}");
                self.warnings.push(format!("{action}: {e}"));
            }
        }
    }
}

/// Outcome of a finished release
#[derive(Debug, Clone)]
pub struct ReleaseSummary {
    /// Released version
    pub version: ReleaseVersion,
    /// Release branch name
    pub release_branch: String,
    /// Per-branch merge results
    pub merge: MergeExecutionResult,
    /// Release notes body
    pub body: String,
    /// Published release, if creation succeeded
    pub release: Option<ReleaseInfo>,
    /// Final summary text
    pub recap: String,
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Every stage ran
    Completed(Box<ReleaseSummary>),
    /// Refused before touching the repository
    Refused(Error),
    /// A stage failed and local changes were undone
    RolledBack {
        /// The failure
        error: Error,
        /// Stage that failed
        stage: Stage,
        /// What the rollback did
        rollback: RollbackReport,
    },
}

impl RunOutcome {
    /// Process exit code: 0 only for a complete run with no skipped conflicts
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(summary) if summary.merge.is_success() => 0,
            _ => 1,
        }
    }
}

/// Release pipeline over one working copy
pub struct ReleasePipeline<'a> {
    options: ReleaseOptions,
    repo: GitRepo,
    factory: &'a dyn PlatformFactory,
    prompter: &'a dyn Prompter,
    progress: &'a dyn ProgressCallback,
}

impl<'a> ReleasePipeline<'a> {
    /// Assemble a pipeline
    pub fn new(
        options: ReleaseOptions,
        repo: GitRepo,
        factory: &'a dyn PlatformFactory,
        prompter: &'a dyn Prompter,
        progress: &'a dyn ProgressCallback,
    ) -> Self {
        Self {
            options,
            repo,
            factory,
            prompter,
            progress,
        }
    }

    /// Run every stage, rolling back on the first failure
    pub async fn run(&self) -> RunOutcome {
        let mut ctx = ReleaseContext::default();

        for stage in Stage::ALL {
            debug!(%stage, "entering stage");
            if let Err(error) = self.run_stage(stage, &mut ctx).await {
                warn!(%stage, %error, "stage failed");
                if stage == Stage::Preflight {
                    return RunOutcome::Refused(error);
                }
                let rollback = self.rollback(&ctx).await;
                return RunOutcome::RolledBack {
                    error,
                    stage,
                    rollback,
                };
            }
        }

        match self.summarize(ctx) {
            Ok(summary) => RunOutcome::Completed(Box::new(summary)),
            Err(error) => RunOutcome::Refused(error),
        }
    }

    async fn run_stage(&self, stage: Stage, ctx: &mut ReleaseContext) -> Result<()> {
        match stage {
            Stage::Preflight => self.preflight().await,
            Stage::SnapshotBranch => {
                ctx.original_branch = Some(self.repo.current_branch().await?);
                Ok(())
            }
            Stage::GatherInputs => {
                ctx.inputs = Some(gather_inputs(
                    self.prompter,
                    self.options.username.as_deref(),
                    self.options.password.as_deref(),
                    self.options.version.as_deref(),
                    self.options.label.as_deref(),
                )?);
                Ok(())
            }
            Stage::ResolveRepository => self.resolve_repository(ctx).await,
            Stage::ResolveBranches => self.resolve_branches(ctx).await,
            Stage::Fetch => self.fetch().await,
            Stage::PrepareReleaseBranch => self.prepare_release_branch(ctx).await,
            Stage::Merge => self.merge(ctx).await,
            Stage::Tag => self.tag(ctx).await,
            Stage::RestoreBranch => self.repo.checkout(ctx.original_branch()?).await,
            Stage::Push => self.push(ctx).await,
            Stage::Publish => self.publish(ctx).await,
            Stage::Recap => {
                ctx.recap = recap(&ctx.inputs()?.version, &ctx.body);
                Ok(())
            }
        }
    }

    async fn preflight(&self) -> Result<()> {
        let modified = self.repo.modified_files().await?;
        if modified.is_empty() {
            Ok(())
        } else {
            Err(Error::DirtyWorkingTree(modified))
        }
    }

    async fn resolve_repository(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let remotes = self.repo.remotes().await?;
        let remote_name = select_remote(&remotes, self.options.remote.as_deref())?;
        let remote = remotes
            .iter()
            .find(|r| r.name == remote_name)
            .ok_or_else(|| Error::RemoteNotFound(remote_name.clone()))?;

        let config = parse_repo_info(&remote.url, self.options.api_host.is_some())?;
        info!(owner = %config.owner, repo = %config.repo, remote = %remote_name, "resolved repository");

        let platform = self.factory.create(
            &config,
            &ctx.inputs()?.credentials,
            self.options.api_timeout,
        )?;

        ctx.remote = Some(remote_name);
        ctx.repository = Some(config);
        ctx.platform = Some(platform);
        Ok(())
    }

    async fn resolve_branches(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let inputs = ctx.inputs()?;
        let prs = fetch_labeled_pull_requests(ctx.platform()?, &inputs.label).await?;
        self.progress
            .on_message(&format!(
                "Found {} pull request(s) labeled {}",
                prs.len(),
                inputs.label
            ))
            .await;

        let plan = create_merge_plan(
            &prs,
            &MergePlanOptions {
                release_branch: inputs.version.release_branch(),
                trunk: self.options.trunk.clone(),
                clear_release_branch: self.options.clear_release_branch,
            },
        );
        debug!(branches = ?plan.branch_names(), "merge plan");
        ctx.plan = plan;
        Ok(())
    }

    async fn fetch(&self) -> Result<()> {
        self.progress.on_wait_start("Fetching remotes").await;
        let result = self.repo.fetch_all().await;
        self.progress.on_wait_end("Fetched remotes").await;
        result
    }

    async fn prepare_release_branch(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let release = ctx.inputs()?.version.release_branch();
        let start = format!("{}/{}", ctx.remote()?, self.options.trunk);

        if self.repo.create_branch(&release, &start).await? {
            ctx.created_branch = true;
            self.progress
                .on_message(&format!("Created {release} from {start}"))
                .await;
        } else {
            ctx.previous_release_tip = self.repo.resolve(&release).await?;
            self.repo.checkout(&release).await?;
            self.progress
                .on_message(&format!("Reusing existing {release}"))
                .await;
        }

        if self.options.clear_release_branch {
            self.repo.reset_hard(&start).await?;
        }
        Ok(())
    }

    async fn merge(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let inputs = ctx.inputs()?;
        let settings = MergeSettings {
            remote: ctx.remote()?.to_string(),
            version: inputs.version,
            username: inputs.credentials.username.clone(),
            policy: self.options.conflict_policy(),
        };
        let deps = MergeDeps {
            repo: &self.repo,
            platform: ctx.platform()?,
            prompter: self.prompter,
            progress: self.progress,
        };

        ctx.merge = execute_merge(&ctx.plan, &settings, &deps).await?;
        Ok(())
    }

    async fn tag(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let inputs = ctx.inputs()?;
        let tag = inputs.version.tag_name();

        if let Some(existing) = self.repo.tag_target(&tag).await? {
            let head = self.repo.resolve("HEAD").await?;
            if head.as_deref() == Some(existing.as_str()) {
                self.progress
                    .on_message(&format!("Tag {tag} already points at the release"))
                    .await;
                return Ok(());
            }
            return Err(Error::TagExists(tag));
        }

        let message = tag_message(&inputs.credentials.username, Utc::now().date_naive());
        self.repo.tag_annotated(&tag, &message).await?;
        ctx.created_tag = true;
        Ok(())
    }

    async fn push(&self, ctx: &ReleaseContext) -> Result<()> {
        let remote = ctx.remote()?;
        let version = &ctx.inputs()?.version;
        self.repo.push(remote, &version.release_branch()).await?;
        self.repo.push(remote, &version.tag_name()).await
    }

    /// Create the release. Failures are reported, never fatal.
    async fn publish(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let version = ctx.inputs()?.version;
        ctx.body = build_release_body(&ctx.plan.pull_requests, &ctx.merge.failed_branches);

        self.progress.on_wait_start("Waiting for GitHub").await;
        tokio::time::sleep(self.options.settle_delay).await;
        self.progress.on_wait_end("Creating release").await;

        let request = ReleaseRequest {
            tag_name: version.tag_name(),
            target_branch: version.release_branch(),
            name: release_name(Utc::now().date_naive()),
            body: ctx.body.clone(),
            prerelease: true,
        };

        let created = ctx.platform()?.create_release(&request).await;
        match created {
            Ok(release) => {
                info!(id = release.id, url = %release.html_url, "release created");
                ctx.release = Some(release);
            }
            Err(e) => {
                warn!(error = %e, "release creation failed");
                self.progress
                    .on_warning(&format!("Could not create the GitHub release: {e}"))
                    .await;
            }
        }
        Ok(())
    }

    /// Undo local changes made by this run. Every step runs; failures
    /// become warnings.
    pub async fn rollback(&self, ctx: &ReleaseContext) -> RollbackReport {
        let mut report = RollbackReport::default();

        report.record(
            "git reset --hard HEAD".to_string(),
            self.repo.discard_changes().await,
        );

        if let Some(original) = &ctx.original_branch {
            report.record(
                format!("git checkout {original}"),
                self.repo.checkout_quiet(original).await,
            );
        }

        let Some(inputs) = &ctx.inputs else {
            return report;
        };
        let release = inputs.version.release_branch();

        if ctx.created_branch {
            report.record(
                format!("git branch -D {release}"),
                self.repo.delete_branch(&release).await,
            );
        } else if let Some(tip) = &ctx.previous_release_tip {
            self.restore_release_tip(ctx, &release, tip, &mut report)
                .await;
        }

        if ctx.created_tag {
            let tag = inputs.version.tag_name();
            report.record(
                format!("git tag -d {tag}"),
                self.repo.delete_tag(&tag).await,
            );
        }

        report
    }

    async fn restore_release_tip(
        &self,
        ctx: &ReleaseContext,
        release: &str,
        tip: &str,
        report: &mut RollbackReport,
    ) {
        match self.repo.resolve(release).await {
            Ok(Some(current)) if current == tip => return,
            Ok(_) => {}
            Err(e) => {
                report.warnings.push(format!("resolve {release}: {e}"));
                return;
            }
        }

        if ctx.original_branch.as_deref() == Some(release) {
            report.record(
                format!("git reset --hard {tip}"),
                self.repo.reset_hard(tip).await,
            );
        } else {
            report.record(
                format!("git branch -f {release} {tip}"),
                self.repo.force_branch(release, tip).await,
            );
        }
    }

    fn summarize(&self, ctx: ReleaseContext) -> Result<ReleaseSummary> {
        let version = ctx.inputs()?.version;
        debug!(options = ?self.options, "release finished");
        Ok(ReleaseSummary {
            version,
            release_branch: version.release_branch(),
            merge: ctx.merge,
            body: ctx.body,
            release: ctx.release,
            recap: ctx.recap,
        })
    }
}
