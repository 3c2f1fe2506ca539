//! Service-specific tests
//!
//! One file per real collaborator. Filesystem tests run inside temp
//! directories; command-driven services run against `MockCommandRunner`.

#[cfg(test)]
mod registry;

// Common test utilities for services
#[cfg(test)]
pub mod common {
    use crate::traits::CommandOutput;

    /// Successful command output with the given stdout
    pub fn ok_output(stdout: &str) -> CommandOutput {
        CommandOutput { success: true, status_code: Some(0), stdout: stdout.to_string(), stderr: String::new() }
    }

    /// Failed command output with the given stderr
    pub fn failed_output(stderr: &str) -> CommandOutput {
        CommandOutput { success: false, status_code: Some(1), stdout: String::new(), stderr: stderr.to_string() }
    }
}
