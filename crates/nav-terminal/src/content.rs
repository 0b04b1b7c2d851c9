// ABOUTME: Per-pane content: display name, last command, and captured output.
// ABOUTME: Survives layout rebuilds and tab switches by value.

use crate::runner::{CommandOutcome, CommandRunner};

/// Output shown while a command is still executing
pub const RUNNING_PLACEHOLDER: &str = "running...";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafContent {
    pub name: String,
    pub command: String,
    pub output: String,
}

impl LeafContent {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Record the command and show the running placeholder
    pub fn begin(&mut self, command: &str) {
        self.command = command.to_string();
        self.output = RUNNING_PLACEHOLDER.to_string();
    }

    pub fn finish(&mut self, outcome: &CommandOutcome) {
        self.output = outcome.display_text();
    }

    /// Run a command to completion (or timeout), storing its output
    pub async fn run(&mut self, runner: &CommandRunner, command: &str) {
        self.begin(command);
        let outcome = runner.run(command).await;
        self.finish(&outcome);
    }

    /// Body text of the pane, below its title
    pub fn body_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.command.is_empty() {
            lines.push(format!("$ {}", self.command));
        }
        if !self.output.is_empty() {
            lines.extend(self.output.lines().map(str::to_string));
        }
        if lines.is_empty() {
            lines.push("(empty)".to_string());
        }
        lines
    }
}
