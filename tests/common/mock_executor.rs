//! Scripted command executor

#![allow(dead_code)]

use async_trait::async_trait;
use make_version::error::Result;
use make_version::repo::{CommandExecutor, CommandOutput, render_command};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

struct Rule {
    prefix: Vec<String>,
    once: VecDeque<CommandOutput>,
    sticky: Option<CommandOutput>,
}

/// Executor that answers from a script and records every call.
///
/// Responses are matched on an argument prefix. One-shot responses are used
/// first, then the sticky one; unmatched commands succeed with empty output.
pub struct MockExecutor {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Executor where every command succeeds silently
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn rule_mut<'a>(rules: &'a mut Vec<Rule>, prefix: &[&str]) -> &'a mut Rule {
        let key: Vec<String> = prefix.iter().map(ToString::to_string).collect();
        if let Some(idx) = rules.iter().position(|r| r.prefix == key) {
            return &mut rules[idx];
        }
        rules.push(Rule {
            prefix: key,
            once: VecDeque::new(),
            sticky: None,
        });
        rules.last_mut().unwrap()
    }

    /// Always answer commands starting with `prefix` with `output`
    pub fn on(&self, prefix: &[&str], output: CommandOutput) -> &Self {
        let mut rules = self.rules.lock().unwrap();
        Self::rule_mut(&mut rules, prefix).sticky = Some(output);
        self
    }

    /// Answer the next command starting with `prefix` with `output`
    pub fn once(&self, prefix: &[&str], output: CommandOutput) -> &Self {
        let mut rules = self.rules.lock().unwrap();
        Self::rule_mut(&mut rules, prefix).once.push_back(output);
        self
    }

    /// Every command run so far, rendered as `git arg arg ...`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose rendering starts with `prefix`
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    /// Assert that `command` was run
    pub fn assert_called(&self, command: &str) {
        let calls = self.calls();
        assert!(
            calls.iter().any(|c| c == command),
            "Expected `{command}` but got: {calls:#?}"
        );
    }

    /// Assert that `command` was never run
    pub fn assert_not_called(&self, command: &str) {
        let calls = self.calls();
        assert!(
            !calls.iter().any(|c| c == command),
            "Expected `{command}` NOT to run but it did: {calls:#?}"
        );
    }

    /// Assert that no call starts with `prefix`
    pub fn assert_nothing_starting_with(&self, prefix: &str) {
        let calls = self.calls_starting_with(prefix);
        assert!(calls.is_empty(), "Unexpected calls: {calls:#?}");
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(render_command(program, args));

        let mut rules = self.rules.lock().unwrap();
        // longest matching prefix wins
        let best = rules
            .iter_mut()
            .filter(|r| {
                r.prefix.len() <= args.len() && r.prefix.iter().zip(args).all(|(p, a)| p == a)
            })
            .max_by_key(|r| r.prefix.len());
        let Some(rule) = best else {
            return Ok(CommandOutput::ok(""));
        };

        // one-shot responses first, then the sticky one
        let output = rule.once.pop_front().or_else(|| rule.sticky.clone());
        Ok(output.unwrap_or_else(|| CommandOutput::ok("")))
    }
}
