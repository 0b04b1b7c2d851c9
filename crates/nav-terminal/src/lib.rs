// ABOUTME: Pane content and shell command execution.
// ABOUTME: Wraps tokio::process to run one-shot commands with a timeout.

pub mod content;
pub mod runner;

pub use content::{LeafContent, RUNNING_PLACEHOLDER};
pub use runner::{CommandOutcome, CommandRunner, ExecError};
