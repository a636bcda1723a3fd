//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Check mark used in completion lines
pub const CHECK: &str = "✓";

/// Cross used for failures
pub const CROSS: &str = "✗";

/// Semantic styles for anything printable.
///
/// Colors are dropped when stdout is not a color-capable terminal.
pub trait Stylize {
    /// De-emphasized text
    fn muted(&self) -> String;
    /// Bold text
    fn emphasis(&self) -> String;
    /// Names and counts
    fn accent(&self) -> String;
    /// Success lines
    fn success(&self) -> String;
    /// Warnings
    fn warn(&self) -> String;
    /// Errors
    fn error(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }

    fn error(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.red())
            .to_string()
    }
}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Red cross
pub fn cross() -> String {
    CROSS.error()
}

/// Muted arrow for sub-items
pub fn arrow() -> String {
    "→".muted()
}

/// Spinner style shared by every wait
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
