//! Vibe coder orchestrator library
//!
//! Runs trend-driven app generation cycles: research trends, rank them into
//! app ideas, filter ideas that duplicate existing projects, generate at most
//! one new app per cycle and keep a durable, capped history of every cycle.

pub mod config;
pub mod core;
pub mod daemon;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use crate::core::{DuplicateDetector, HistorySummary, InMemoryHistoryStore};
pub use config::VibeConfig;
pub use daemon::{run_daemon, DaemonSettings};
pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::{CycleSettings, Orchestrator};
pub use traits::{CycleRunner, Generator, HistoryStore, LocalProjects, ProjectRegistry, ResearchSource};
