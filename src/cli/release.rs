//! Release command - build, tag and publish a release branch

use crate::cli::CliProgress;
use crate::cli::style::{CHECK, Stylize, arrow};
use anstream::{eprintln, println};
use make_version::config::ReleaseOptions;
use make_version::platform::{GitHubFactory, api_base_for_host};
use make_version::prompt::DialoguerPrompter;
use make_version::release::{ReleasePipeline, ReleaseSummary, RunOutcome};
use make_version::repo::{GitRepo, ProcessExecutor};
use std::io::IsTerminal;
use std::sync::Arc;

/// Run the release command
pub async fn run_release(options: ReleaseOptions) -> RunOutcome {
    let factory = options
        .api_host
        .as_deref()
        .map_or_else(GitHubFactory::new, |host| {
            GitHubFactory::with_api_base(api_base_for_host(host))
        });
    let progress = if options.silent {
        CliProgress::silent()
    } else {
        CliProgress::verbose()
    };
    let repo = GitRepo::new(Arc::new(ProcessExecutor), options.repository_path.clone());

    if !options.silent {
        println!(
            "{} {}",
            "Preparing release in".emphasis(),
            options.repository_path.display().accent()
        );
    }

    ReleasePipeline::new(options, repo, &factory, &DialoguerPrompter, &progress)
        .run()
        .await
}

/// Print the outcome of a run
pub fn report_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed(summary) => print_summary(summary),
        RunOutcome::Refused(error) => {
            eprintln!("{} {error}", "Error:".error());
        }
        RunOutcome::RolledBack {
            error,
            stage,
            rollback,
        } => {
            eprintln!("{} {error}", format!("Error during {stage}:").error());
            if !rollback.actions.is_empty() {
                eprintln!("{}", "Rolled back:".muted());
                for action in &rollback.actions {
                    eprintln!("  {} {}", arrow(), action.muted());
                }
            }
            for warning in &rollback.warnings {
                eprintln!("  {}", format!("⚠️  rollback incomplete: {warning}").warn());
            }
        }
    }
}

fn print_summary(summary: &ReleaseSummary) {
    println!();
    println!("{}", summary.recap);
    println!();

    match &summary.release {
        Some(release) => {
            let hyperlinks =
                std::io::stdout().is_terminal() && supports_hyperlinks::supports_hyperlinks();
            let link = if hyperlinks {
                terminal_link::Link::new(&release.html_url, &release.html_url).to_string()
            } else {
                release.html_url.clone()
            };
            println!(
                "{} {} {}",
                format!("{CHECK} Released").success(),
                summary.version.accent(),
                link
            );
        }
        None => println!(
            "{} {} {}",
            format!("{CHECK} Tagged").success(),
            summary.version.accent(),
            "(GitHub release not created)".muted()
        ),
    }

    if !summary.merge.failed_branches.is_empty() {
        println!(
            "{}",
            format!(
                "{} branch(es) skipped because of merge conflicts",
                summary.merge.failed_branches.len()
            )
            .warn()
        );
    }
}
