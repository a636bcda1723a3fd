//! make-version - merge labeled pull requests into a release branch

mod cli;

use clap::Parser;
use make_version::config::{CliOverrides, ReleaseOptions, default_log_filter, load_config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Merge every pull request carrying a label into `release_<major>.<minor>`,
/// tag the result and publish a GitHub prerelease.
#[derive(Parser)]
#[command(name = "make-version")]
#[command(author, version, long_about = None)]
struct Cli {
    /// GitHub username
    #[arg(short, long)]
    username: Option<String>,

    /// GitHub password or personal access token
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    password: Option<String>,

    /// Label of the issues whose pull requests are merged
    #[arg(short, long)]
    label: Option<String>,

    /// Version to build (major.minor.patch)
    #[arg(short, long = "build", value_name = "VERSION")]
    build: Option<String>,

    /// Path to the repository (defaults to the current directory)
    #[arg(short, long)]
    repository: Option<PathBuf>,

    /// Skip branches that conflict instead of asking
    #[arg(short, long)]
    skip_merge_conflict: bool,

    /// Rebuild the release branch from trunk
    #[arg(short, long)]
    clear: bool,

    /// Only print warnings, errors and the final recap
    #[arg(long)]
    silent: bool,

    /// Trunk branch the release starts from
    #[arg(long)]
    trunk: Option<String>,

    /// Remote to fetch from and push to
    #[arg(long)]
    remote: Option<String>,

    /// GitHub Enterprise host (or full API base URL)
    #[arg(long)]
    api_host: Option<String>,
}

fn init_tracing(silent: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(silent))),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn repository_path(requested: Option<PathBuf>) -> std::io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match requested {
        Some(path) if path.is_absolute() => path,
        Some(path) => cwd.join(path),
        None => cwd,
    })
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    init_tracing(args.silent);

    let path = match repository_path(args.repository) {
        Ok(path) if path.is_dir() => path,
        Ok(path) => {
            anstream::eprintln!("Error: repository path not found: {}", path.display());
            std::process::exit(1);
        }
        Err(e) => {
            anstream::eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let file = match load_config(&path) {
        Ok(file) => file,
        Err(e) => {
            anstream::eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let overrides = CliOverrides {
        username: args.username,
        password: args.password,
        label: args.label,
        version: args.build,
        skip_merge_conflict: args.skip_merge_conflict,
        clear_release_branch: args.clear,
        silent: args.silent,
        trunk: args.trunk,
        remote: args.remote,
        api_host: args.api_host,
    };
    let options = ReleaseOptions::resolve(path, overrides, file);

    let outcome = cli::run_release(options).await;
    cli::report_outcome(&outcome);
    std::process::exit(outcome.exit_code());
}
