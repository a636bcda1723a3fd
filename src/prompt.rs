//! Interactive prompting
//!
//! Values not supplied on the command line are asked for here. The
//! [`Prompter`] trait keeps the release flow independent of the terminal so
//! conflict handling can be driven by scripted answers.

use crate::error::{Error, Result};
use crate::types::{
    ConflictResolution, Credentials, DEFAULT_LABEL, ReleaseVersion, VERSION_PATTERN,
};
use dialoguer::{Input, Password};
use regex::Regex;

/// Pattern the conflict question accepts
pub const CONFLICT_ANSWER_PATTERN: &str = "^(yes|no)$";

const VERSION_QUESTION: &str = "Version to build (e.g. 2.3.0)";

/// Question shown after a conflicting merge
pub const CONFLICT_QUESTION: &str = "Please resolve the merge conflict. When you are done please type\n\t- \"yes\" to proceed\n\t- \"no\" to abort the creation of the release\nyes/no?";

/// A single question to put to the operator
#[derive(Debug, Clone)]
pub struct PromptSpec {
    /// Short identifier (used by scripted prompters)
    pub name: String,
    /// Text shown to the operator
    pub message: String,
    /// Answers must match this pattern; others are asked again
    pub pattern: Option<Regex>,
    /// Do not echo the answer
    pub hidden: bool,
    /// Answer used when the operator just presses enter
    pub default: Option<String>,
}

impl PromptSpec {
    /// A required, visible question with no validation
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            pattern: None,
            hidden: false,
            default: None,
        }
    }

    /// Require answers to match `pattern`
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| Error::Prompt(e.to_string()))?;
        self.pattern = Some(re);
        Ok(self)
    }

    /// Hide the answer while typing
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Fall back to `value` on an empty answer
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Whether `answer` satisfies the pattern (if any)
    pub fn accepts(&self, answer: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(answer))
    }
}

/// Source of operator answers
pub trait Prompter: Send + Sync {
    /// Ask `spec` until an acceptable answer is given
    fn ask(&self, spec: &PromptSpec) -> Result<String>;

    /// Show a block of text (e.g. a conflict diff)
    fn show(&self, text: &str);
}

/// Terminal prompter backed by dialoguer
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn ask(&self, spec: &PromptSpec) -> Result<String> {
        if spec.hidden {
            loop {
                let answer = Password::new().with_prompt(&spec.message).interact()?;
                if spec.accepts(&answer) {
                    return Ok(answer);
                }
            }
        }

        let mut input = Input::<String>::new().with_prompt(&spec.message);
        if let Some(default) = &spec.default {
            input = input.default(default.clone()).show_default(true);
        }
        if let Some(re) = &spec.pattern {
            let re = re.clone();
            input = input.validate_with(move |answer: &String| {
                if re.is_match(answer.trim()) {
                    Ok(())
                } else {
                    Err(format!("answer must match {}", re.as_str()))
                }
            });
        }

        Ok(input.interact_text()?.trim().to_string())
    }

    fn show(&self, text: &str) {
        anstream::println!("{text}");
    }
}

/// Values gathered before the release starts
#[derive(Debug, Clone)]
pub struct GatheredInputs {
    /// Hosting credentials
    pub credentials: Credentials,
    /// Version being released
    pub version: ReleaseVersion,
    /// Issue label selecting the pull requests
    pub label: String,
}

/// Complete the caller-supplied values, asking only for what is missing.
///
/// A supplied version is validated but never re-asked: an invalid one is an
/// error.
pub fn gather_inputs(
    prompter: &dyn Prompter,
    username: Option<&str>,
    password: Option<&str>,
    version: Option<&str>,
    label: Option<&str>,
) -> Result<GatheredInputs> {
    let username = match non_empty(username) {
        Some(u) => u.to_string(),
        None => prompter.ask(&PromptSpec::new("username", "GitHub username"))?,
    };

    let password = match non_empty(password) {
        Some(p) => p.to_string(),
        None => prompter.ask(&PromptSpec::new("password", "GitHub password or token").hidden())?,
    };

    let version = match non_empty(version) {
        Some(v) => v.parse()?,
        None => ask_version(prompter)?,
    };

    let label = match non_empty(label) {
        Some(l) => l.to_string(),
        None => {
            let spec = PromptSpec::new("label", "Label of the issues to merge");
            prompter.ask(&spec.with_default(DEFAULT_LABEL))?
        }
    };

    Ok(GatheredInputs {
        credentials: Credentials { username, password },
        version,
        label,
    })
}

/// Ask for the version until an answer parses
fn ask_version(prompter: &dyn Prompter) -> Result<ReleaseVersion> {
    let spec = PromptSpec::new("version", VERSION_QUESTION).with_pattern(VERSION_PATTERN)?;
    loop {
        match prompter.ask(&spec)?.parse() {
            Ok(version) => return Ok(version),
            Err(e) => prompter.show(&e.to_string()),
        }
    }
}

/// Ask how to proceed after a conflicting merge
pub fn ask_conflict_resolution(prompter: &dyn Prompter) -> Result<ConflictResolution> {
    let spec =
        PromptSpec::new("conflict", CONFLICT_QUESTION).with_pattern(CONFLICT_ANSWER_PATTERN)?;
    prompter.ask(&spec)?.parse()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
