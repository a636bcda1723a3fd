//! make-version: release branch builder
//!
//! Collects the pull requests behind every open issue carrying a label,
//! merges their head branches into `release_<major>.<minor>`, tags the
//! result, pushes it and publishes a GitHub prerelease. Any failure rolls
//! the local repository back to where it started.

pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod progress;
pub mod prompt;
pub mod release;
pub mod repo;
pub mod types;

pub use error::{Error, Result};
