//! Local repository access
//!
//! Everything that touches the working copy goes through [`GitRepo`], which
//! runs `git` via a [`CommandExecutor`]. Tests swap in a scripted executor.

mod executor;
mod git;

pub use executor::{CommandExecutor, CommandOutput, ProcessExecutor, render_command};
pub use git::{GitRepo, parse_remotes, select_remote};
