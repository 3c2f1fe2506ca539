//! Real subprocess runner
//!
//! Every external tool goes through here so that timeouts, kill-on-drop and
//! not-installed detection behave the same for `gh`, `git` and the AI tool.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{CommandOutput, CommandRunner, CommandSpec};
use shared::{process_debug, ProcessId};

/// Runs commands with tokio, capturing stdout and stderr
#[derive(Debug, Default, Clone)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for RealCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> OrchestratorResult<CommandOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        process_debug!(ProcessId::current(), "⚙️ Running: {}", spec.display());

        let child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => OrchestratorError::CommandNotFound { command: spec.program.clone() },
            _ => OrchestratorError::process(spec.display(), format!("failed to spawn: {e}")),
        })?;

        // Dropping the pending future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| OrchestratorError::process(spec.display(), e.to_string()))?,
            Err(_) => return Err(OrchestratorError::timeout(spec.display(), spec.timeout)),
        };

        Ok(CommandOutput {
            success: output.status.success(),
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Turn a finished command into its stdout, or an error tagged with `source_tag`
pub fn require_success(source_tag: &str, spec: &CommandSpec, output: CommandOutput) -> OrchestratorResult<String> {
    if output.success {
        return Ok(output.stdout);
    }
    let detail = output.stderr.trim();
    Err(OrchestratorError::collaborator(
        source_tag,
        format!(
            "'{}' exited with {}: {}",
            spec.display(),
            output.status_code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
            if detail.is_empty() { "no output" } else { detail }
        ),
    ))
}
