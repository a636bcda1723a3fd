//! Real git repositories in temporary directories

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Remote URL the working copy is configured with
pub const GITHUB_URL: &str = "git@github.com:acme/widgets.git";

/// A working copy cloned from a local bare `origin`.
///
/// `origin` is configured with a github.com URL that git rewrites (via
/// `url.<base>.insteadOf`) to the bare repository, so detection sees
/// `acme/widgets` while fetch and push stay local.
pub struct TempGitRepo {
    dir: TempDir,
    work: PathBuf,
    origin: PathBuf,
}

fn run_git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

impl TempGitRepo {
    /// Create `origin` and a working copy with one commit on `master`
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let origin = dir.path().join("origin.git");
        let work = dir.path().join("work");
        fs::create_dir_all(&origin).unwrap();
        fs::create_dir_all(&work).unwrap();

        run_git(&origin, &["init", "-q", "--bare"]);
        run_git(&origin, &["symbolic-ref", "HEAD", "refs/heads/master"]);

        run_git(&work, &["init", "-q"]);
        run_git(&work, &["checkout", "-q", "-b", "master"]);
        run_git(&work, &["config", "user.name", "Release Bot"]);
        run_git(&work, &["config", "user.email", "release@example.com"]);
        run_git(&work, &["config", "commit.gpgsign", "false"]);
        run_git(&work, &["config", "tag.gpgsign", "false"]);
        let origin_str = origin.to_str().unwrap();
        run_git(
            &work,
            &["config", &format!("url.{origin_str}.insteadOf"), GITHUB_URL],
        );
        run_git(&work, &["remote", "add", "origin", GITHUB_URL]);

        let repo = Self { dir, work, origin };
        repo.write_file("README.md", "widgets\n");
        repo.write_file("shared.txt", "base\n");
        repo.git(&["add", "."]);
        repo.git(&["commit", "-q", "-m", "Initial commit"]);
        repo.git(&["push", "-q", "origin", "master"]);
        repo
    }

    /// Path of the working copy
    pub fn path(&self) -> &Path {
        &self.work
    }

    /// Path of the bare origin
    pub fn origin_path(&self) -> &Path {
        &self.origin
    }

    /// Run git in the working copy and return stdout
    pub fn git(&self, args: &[&str]) -> String {
        run_git(&self.work, args)
    }

    /// Run git in the bare origin and return stdout
    pub fn origin_git(&self, args: &[&str]) -> String {
        run_git(&self.origin, args)
    }

    /// Write a file in the working copy
    pub fn write_file(&self, name: &str, content: &str) {
        let path = self.work.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Read a file from the working copy
    pub fn read_file(&self, name: &str) -> String {
        fs::read_to_string(self.work.join(name)).unwrap()
    }

    /// Push a branch to origin with one commit writing `file`, then return to master
    pub fn push_feature_branch(&self, branch: &str, file: &str, content: &str) {
        self.git(&["checkout", "-q", "-b", branch, "master"]);
        self.write_file(file, content);
        self.git(&["add", file]);
        self.git(&["commit", "-q", "-m", &format!("Work on {branch}")]);
        self.git(&["push", "-q", "origin", branch]);
        self.git(&["checkout", "-q", "master"]);
        self.git(&["branch", "-q", "-D", branch]);
    }

    /// Name of the checked-out branch
    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
            .trim()
            .to_string()
    }

    /// Whether a local branch exists
    pub fn has_branch(&self, name: &str) -> bool {
        !self.git(&["branch", "--list", name]).trim().is_empty()
    }

    /// Whether a local tag exists
    pub fn has_tag(&self, name: &str) -> bool {
        !self.git(&["tag", "--list", name]).trim().is_empty()
    }

    /// Whether origin has `refs/<kind>/<name>`
    pub fn origin_has_ref(&self, reference: &str) -> bool {
        !self
            .origin_git(&["for-each-ref", reference])
            .trim()
            .is_empty()
    }

    /// Files tracked at `rev`
    pub fn files_at(&self, rev: &str) -> Vec<String> {
        self.git(&["ls-tree", "-r", "--name-only", rev])
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    /// Commit subjects reachable from `rev`
    pub fn log_subjects(&self, rev: &str) -> Vec<String> {
        self.git(&["log", "--format=%s", rev])
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    /// `git status --porcelain` output
    pub fn status(&self) -> String {
        self.git(&["status", "--porcelain"])
    }

    /// Keep the temp dir alive explicitly
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
