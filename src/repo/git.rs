//! Typed git operations on a working copy

use crate::error::{Error, Result};
use crate::repo::executor::{CommandExecutor, CommandOutput, render_command};
use crate::types::GitRemote;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const GIT: &str = "git";

/// How loudly a command reports itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Echo {
    /// Mutating step of the release, reported at info level
    Loud,
    /// Query or cleanup, reported at debug level
    Quiet,
}

/// A git working copy driven through a [`CommandExecutor`]
#[derive(Clone)]
pub struct GitRepo {
    executor: Arc<dyn CommandExecutor>,
    path: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo").field("path", &self.path).finish()
    }
}

impl GitRepo {
    /// Create a repo handle rooted at `path`
    pub fn new(executor: Arc<dyn CommandExecutor>, path: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            path: path.into(),
        }
    }

    /// Working directory commands run in
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a command whose failure is fatal
    async fn exec(&self, args: &[&str], echo: Echo) -> Result<String> {
        let command = render_command(GIT, args);
        let output = self.executor.execute(GIT, args, &self.path).await?;

        if !output.success {
            match echo {
                Echo::Loud => info!("ERROR {command}"),
                Echo::Quiet => debug!("ERROR {command}"),
            }
            return Err(Error::CommandFailed {
                command,
                stderr: output.stderr.trim().to_string(),
            });
        }

        match echo {
            Echo::Loud => info!("SUCCESS {command}"),
            Echo::Quiet => debug!("SUCCESS {command}"),
        }
        Ok(output.stdout)
    }

    /// Run a release step; a non-zero exit is an error
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        self.exec(args, Echo::Loud).await
    }

    /// Run a query or cleanup command; a non-zero exit is an error
    pub async fn query(&self, args: &[&str]) -> Result<String> {
        self.exec(args, Echo::Quiet).await
    }

    /// Run a command whose failure the caller declared tolerable
    pub async fn run_tolerant(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.executor.execute(GIT, args, &self.path).await?;
        debug!(
            command = %render_command(GIT, args),
            success = output.success,
            "tolerant command finished"
        );
        Ok(output)
    }

    /// Tracked files with uncommitted modifications
    pub async fn modified_files(&self) -> Result<Vec<String>> {
        let out = self
            .query(&["status", "--porcelain", "--untracked-files=no"])
            .await?;
        Ok(non_empty_lines(&out))
    }

    /// Name of the currently checked-out branch
    pub async fn current_branch(&self) -> Result<String> {
        let out = self.query(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(out.trim().to_string())
    }

    /// Resolve a revision to a commit id
    pub async fn rev_parse(&self, rev: &str) -> Result<String> {
        let out = self.query(&["rev-parse", "--verify", rev]).await?;
        Ok(out.trim().to_string())
    }

    /// Resolve a revision, or `None` when it does not exist
    pub async fn resolve(&self, rev: &str) -> Result<Option<String>> {
        let output = self
            .run_tolerant(&["rev-parse", "--verify", "--quiet", rev])
            .await?;
        Ok(output
            .success
            .then(|| output.stdout.trim().to_string())
            .filter(|id| !id.is_empty()))
    }

    /// Commit a tag points at, or `None` when the tag does not exist
    pub async fn tag_target(&self, tag: &str) -> Result<Option<String>> {
        self.resolve(&format!("refs/tags/{tag}^{{commit}}")).await
    }

    /// Configured remotes, in config order.
    ///
    /// URLs are read as written in the config, before any
    /// `url.<base>.insteadOf` rewriting, so they still name the hosted
    /// repository when fetches go through a mirror.
    pub async fn remotes(&self) -> Result<Vec<GitRemote>> {
        let args = ["config", "--get-regexp", r"^remote\..*\.url$"];
        let output = self.run_tolerant(&args).await?;

        // git config exits 1 without output when nothing matches
        if !output.success && !output.stderr.trim().is_empty() {
            return Err(Error::CommandFailed {
                command: render_command(GIT, &args),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(parse_remotes(&output.stdout))
    }

    /// Fetch every remote
    pub async fn fetch_all(&self) -> Result<()> {
        self.run(&["fetch", "--all"]).await.map(drop)
    }

    /// Create `name` from `start` and check it out.
    ///
    /// Returns `false` when git refuses (typically because the branch already
    /// exists locally) so the caller can fall back to reusing it.
    pub async fn create_branch(&self, name: &str, start: &str) -> Result<bool> {
        let output = self.run_tolerant(&["checkout", "-b", name, start]).await?;
        if output.success {
            info!("SUCCESS git checkout -b {name} {start}");
        } else {
            debug!(branch = name, stderr = %output.stderr.trim(), "branch not created");
        }
        Ok(output.success)
    }

    /// Check out an existing branch
    pub async fn checkout(&self, name: &str) -> Result<()> {
        self.run(&["checkout", name]).await.map(drop)
    }

    /// Check out an existing branch without reporting it as a release step
    pub async fn checkout_quiet(&self, name: &str) -> Result<()> {
        self.query(&["checkout", name]).await.map(drop)
    }

    /// Hard-reset the current branch and working tree to `target`
    pub async fn reset_hard(&self, target: &str) -> Result<()> {
        self.run(&["reset", "--hard", target]).await.map(drop)
    }

    /// Discard every uncommitted change, including an in-progress merge
    pub async fn discard_changes(&self) -> Result<()> {
        self.query(&["reset", "--hard", "HEAD"]).await.map(drop)
    }

    /// Merge `rev` without fast-forward and without committing.
    ///
    /// Returns `true` for a clean merge and `false` when git stopped on a
    /// conflict.
    pub async fn merge_no_commit(&self, rev: &str) -> Result<bool> {
        let args = ["merge", "--no-commit", "--no-ff", rev];
        let output = self.run_tolerant(&args).await?;
        let command = render_command(GIT, &args);
        if output.success {
            info!("SUCCESS {command}");
        } else {
            info!("ERROR {command}");
        }
        Ok(output.success)
    }

    /// Working-tree diff (shows conflict markers during a conflicted merge)
    pub async fn diff(&self) -> Result<String> {
        self.run(&["diff"]).await
    }

    /// Abort the in-progress merge
    pub async fn merge_abort(&self) -> Result<()> {
        self.run(&["merge", "--abort"]).await.map(drop)
    }

    /// Files that still contain conflict markers, staged or not
    pub async fn paths_with_conflict_markers(&self) -> Result<Vec<String>> {
        // against HEAD so `git add`ed files are checked too; exits non-zero
        // whenever it reports something
        let output = self.run_tolerant(&["diff", "HEAD", "--check"]).await?;
        let mut paths: Vec<String> = Vec::new();

        for line in output.stdout.lines() {
            if !line.ends_with("leftover conflict marker") {
                continue;
            }
            if let Some((path, _)) = line.split_once(':')
                && !paths.iter().any(|p| p == path)
            {
                paths.push(path.to_string());
            }
        }
        Ok(paths)
    }

    /// Commit every tracked change. Failure (e.g. nothing to commit) is tolerated.
    pub async fn commit_all(&self, message: &str) -> Result<CommandOutput> {
        let output = self.run_tolerant(&["commit", "-am", message]).await?;
        if !output.success {
            debug!(stdout = %output.stdout.trim(), "commit skipped");
        }
        Ok(output)
    }

    /// Create an annotated tag on HEAD
    pub async fn tag_annotated(&self, name: &str, message: &str) -> Result<()> {
        self.run(&["tag", "-a", name, "-m", message])
            .await
            .map(drop)
    }

    /// Push a single ref to `remote`
    pub async fn push(&self, remote: &str, refname: &str) -> Result<()> {
        self.run(&["push", remote, refname]).await.map(drop)
    }

    /// Force-delete a local branch
    pub async fn delete_branch(&self, name: &str) -> Result<()> {
        self.query(&["branch", "-D", name]).await.map(drop)
    }

    /// Move a local branch to `commit` without checking it out
    pub async fn force_branch(&self, name: &str, commit: &str) -> Result<()> {
        self.query(&["branch", "-f", name, commit]).await.map(drop)
    }

    /// Delete a local tag
    pub async fn delete_tag(&self, name: &str) -> Result<()> {
        self.query(&["tag", "-d", name]).await.map(drop)
    }
}

fn non_empty_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse `git config --get-regexp '^remote\..*\.url$'` output into remotes
pub fn parse_remotes(output: &str) -> Vec<GitRemote> {
    let mut remotes: Vec<GitRemote> = Vec::new();

    for line in output.lines() {
        let Some((key, url)) = line.trim().split_once(char::is_whitespace) else {
            continue;
        };
        let Some(name) = key
            .strip_prefix("remote.")
            .and_then(|k| k.strip_suffix(".url"))
        else {
            continue;
        };
        if name.is_empty() || remotes.iter().any(|r| r.name == name) {
            continue;
        }
        remotes.push(GitRemote {
            name: name.to_string(),
            url: url.trim().to_string(),
        });
    }

    remotes
}

/// Select a remote: the requested one, else `origin`, else the first listed
pub fn select_remote(remotes: &[GitRemote], requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return remotes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.name.clone())
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }

    remotes
        .iter()
        .find(|r| r.name == "origin")
        .or_else(|| remotes.first())
        .map(|r| r.name.clone())
        .ok_or(Error::NoSupportedRemotes)
}
