// ABOUTME: One-shot shell command execution for panes.
// ABOUTME: Captures merged stdout/stderr, enforces a timeout, and maps failures to sentinels.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use nav_core::Config;
use tokio::process::Command;

/// Runs commands through `<shell> -c`
#[derive(Debug, Clone)]
pub struct CommandRunner {
    shell: String,
    timeout: Duration,
}

/// Final state of a finished (or abandoned) command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Trimmed, non-empty combined output
    Output(String),
    NoOutput,
    Timeout,
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to spawn {shell}: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect output: {0}")]
    Wait(#[source] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl CommandOutcome {
    /// Text stored as the pane's output
    pub fn display_text(&self) -> String {
        match self {
            CommandOutcome::Output(text) => text.clone(),
            CommandOutcome::NoOutput => "(no output)".to_string(),
            CommandOutcome::Timeout => "(timeout)".to_string(),
            CommandOutcome::Failed(reason) => format!("(error: {})", reason),
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<Result<String, ExecError>> for CommandOutcome {
    fn from(result: Result<String, ExecError>) -> Self {
        match result {
            Ok(text) if text.is_empty() => CommandOutcome::NoOutput,
            Ok(text) => CommandOutcome::Output(text),
            Err(ExecError::Timeout(_)) => CommandOutcome::Timeout,
            Err(e) => CommandOutcome::Failed(e.to_string()),
        }
    }
}

impl CommandRunner {
    pub fn new(shell: impl Into<String>, timeout: Duration) -> Self {
        Self {
            shell: shell.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.shell.clone(), config.command_timeout())
    }

    /// Run a command to completion and return its trimmed output.
    /// stderr is redirected into stdout so both arrive in the order written.
    /// The child is killed if the timeout elapses.
    pub async fn execute(&self, command: &str) -> Result<String, ExecError> {
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(merged_streams(command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                shell: self.shell.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(ExecError::Wait)?,
            Err(_) => return Err(ExecError::Timeout(self.timeout)),
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        // Only the shell's own diagnostics (syntax errors) land here
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }

        Ok(text.trim().to_string())
    }

    /// Run a command and fold every failure into a [`CommandOutcome`]
    pub async fn run(&self, command: &str) -> CommandOutcome {
        let result = self.execute(command).await;
        match &result {
            Ok(_) => tracing::debug!("Command {:?} finished", command),
            Err(ExecError::Timeout(limit)) => {
                tracing::warn!("Command {:?} timed out after {:?}", command, limit)
            }
            Err(e) => tracing::error!("Command {:?} failed: {}", command, e),
        }
        result.into()
    }
}

/// Group the command so one `2>&1` covers all of it. The newline ends any
/// trailing comment before the closing brace.
fn merged_streams(command: &str) -> String {
    format!("{{ {}\n}} 2>&1", command)
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
