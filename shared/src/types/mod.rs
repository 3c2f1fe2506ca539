//! Core types used throughout the vibe coder system

pub mod records;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub use records::*;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Fallback used before any role has been registered (library use, tests)
static DEFAULT_PROCESS_ID: ProcessId = ProcessId::Runner;

/// Role of the running process, attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProcessId {
    /// One-shot command (`run`, `status`, `list`)
    #[default]
    Runner,
    /// Long-running cycle loop
    Daemon,
}

impl ProcessId {
    /// Initialize the global process ID for one-shot commands
    pub fn init_runner() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Runner)
    }

    /// Initialize the global process ID for daemon mode
    pub fn init_daemon() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Daemon)
    }

    /// Get the global process ID, falling back to the runner role
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&DEFAULT_PROCESS_ID)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Runner => write!(f, "runner"),
            ProcessId::Daemon => write!(f, "daemon"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_id_display() {
        assert_eq!(ProcessId::Runner.to_string(), "runner");
        assert_eq!(ProcessId::Daemon.to_string(), "daemon");
    }

    #[test]
    fn test_default_is_runner() {
        assert_eq!(ProcessId::default(), ProcessId::Runner);
    }

    #[test]
    fn test_current_falls_back_without_init() {
        // Never initialised in this test binary
        let current = ProcessId::current();
        assert!(matches!(current, ProcessId::Runner | ProcessId::Daemon));
    }
}
