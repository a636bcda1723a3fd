//! Scripted prompter

#![allow(dead_code)]

use make_version::error::{Error, Result};
use make_version::prompt::{PromptSpec, Prompter};
use std::collections::VecDeque;
use std::sync::Mutex;

type Hook = Box<dyn Fn(&PromptSpec, usize) + Send + Sync>;

/// Prompter that replays canned answers.
///
/// Answers a spec would reject are consumed and counted, the same way a
/// terminal user would be asked again.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
    shown: Mutex<Vec<String>>,
    rejected: Mutex<Vec<String>>,
    before_answer: Option<Hook>,
}

impl ScriptedPrompter {
    /// Prompter answering with `answers`, in order
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(ToString::to_string).collect()),
            asked: Mutex::new(Vec::new()),
            shown: Mutex::new(Vec::new()),
            rejected: Mutex::new(Vec::new()),
            before_answer: None,
        }
    }

    /// Prompter that fails on any question
    pub fn silent() -> Self {
        Self::new(&[])
    }

    /// Run `hook` before each answer (with the 1-based question count)
    pub fn with_hook(mut self, hook: impl Fn(&PromptSpec, usize) + Send + Sync + 'static) -> Self {
        self.before_answer = Some(Box::new(hook));
        self
    }

    /// Names of the prompts asked, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    /// Text passed to `show`
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    /// Answers that failed validation
    pub fn rejected(&self) -> Vec<String> {
        self.rejected.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, spec: &PromptSpec) -> Result<String> {
        let count = {
            let mut asked = self.asked.lock().unwrap();
            asked.push(spec.name.clone());
            asked.len()
        };

        if let Some(hook) = &self.before_answer {
            hook(spec, count);
        }

        let mut answers = self.answers.lock().unwrap();
        while let Some(answer) = answers.pop_front() {
            if answer.is_empty()
                && let Some(default) = &spec.default
            {
                return Ok(default.clone());
            }
            if spec.accepts(&answer) {
                return Ok(answer);
            }
            self.rejected.lock().unwrap().push(answer);
        }

        let name = &spec.name;
        Err(Error::Prompt(format!("no scripted answer for '{name}'")))
    }

    fn show(&self, text: &str) {
        self.shown.lock().unwrap().push(text.to_string());
    }
}
