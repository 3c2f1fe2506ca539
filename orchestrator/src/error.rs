//! Orchestrator-specific error types

use shared::{CycleResult, SharedError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Collaborator '{source_tag}' failed: {message}")]
    CollaboratorError { source_tag: String, message: String },

    #[error("{operation} timed out after {}s", timeout.as_secs())]
    Timeout { operation: String, timeout: Duration },

    #[error("Command '{command}' failed: {message}")]
    ProcessError { command: String, message: String },

    #[error("Command '{command}' is not installed")]
    CommandNotFound { command: String },

    #[error("App generation failed: {message}")]
    GenerationError { message: String },

    #[error("History persistence failed for {path}: {message}")]
    HistoryError { path: String, message: String },

    /// The cycle ran to completion but its result could not be persisted
    #[error("Cycle finished but was not saved: {message}")]
    CycleNotSaved { result: Box<CycleResult>, message: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl OrchestratorError {
    pub fn collaborator(source_tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CollaboratorError { source_tag: source_tag.into(), message: message.into() }
    }

    pub fn config(field: impl Into<String>) -> Self {
        Self::ConfigurationError { field: field.into() }
    }

    pub fn process(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessError { command: command.into(), message: message.into() }
    }

    pub fn history(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::HistoryError { path: path.display().to_string(), message: message.into() }
    }

    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout { operation: operation.into(), timeout }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
