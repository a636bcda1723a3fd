//! Command-line front end

mod release;
pub mod style;

pub use release::{report_outcome, run_release};

use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use make_version::progress::ProgressCallback;
use make_version::types::MergeOutcome;
use std::sync::Mutex;
use std::time::Duration;
use style::{Stylize, arrow, check, cross, spinner_style};

/// Progress renderer for the terminal
pub struct CliProgress {
    silent: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Progress that prints every update
    pub const fn verbose() -> Self {
        Self {
            silent: false,
            spinner: Mutex::new(None),
        }
    }

    /// Progress that only prints warnings
    pub const fn silent() -> Self {
        Self {
            silent: true,
            spinner: Mutex::new(None),
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut s| s.take())
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        if !self.silent {
            println!("{} {}", arrow(), message);
        }
    }

    async fn on_warning(&self, message: &str) {
        eprintln!("{}", format!("⚠️  {message}").warn());
    }

    async fn on_merge_outcome(&self, branch: &str, outcome: MergeOutcome) {
        if self.silent {
            return;
        }
        let mark = match outcome {
            MergeOutcome::Merged => check(),
            MergeOutcome::SkippedNoSuchBranch => "-".muted(),
            MergeOutcome::SkippedConflict | MergeOutcome::Aborted => cross(),
        };
        println!("  {mark} {} {}", branch.accent(), outcome.muted());
    }

    async fn on_wait_start(&self, message: &str) {
        if self.silent {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!("{message}..."));
        spinner.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.spinner.lock()
            && let Some(previous) = slot.replace(spinner)
        {
            previous.finish_and_clear();
        }
    }

    async fn on_wait_end(&self, message: &str) {
        if let Some(spinner) = self.take_spinner() {
            spinner.finish_with_message(format!("{} {message}", check()));
        }
    }
}
