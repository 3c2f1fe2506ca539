//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator the cycle talks to sits behind one of these traits so the
//! orchestrator can be driven entirely by mocks and in-memory doubles.

use std::path::PathBuf;
use std::time::Duration;

use shared::{CycleResult, DuplicateCheck, TrendRecord};

use crate::error::OrchestratorResult;

/// Summary of an existing project in the remote registry
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An existing project directory on local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalProject {
    pub name: String,
    pub path: PathBuf,
    /// Leading characters of the project's readme, if it has one
    pub readme_excerpt: Option<String>,
}

/// Everything the generator needs to build one app
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub idea_id: String,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub is_ai_infused: bool,
    pub ai_capabilities: Vec<String>,
}

/// Structured result of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub success: bool,
    pub app_name: String,
    pub published_ref: Option<String>,
    pub error: Option<String>,
}

impl GenerationOutcome {
    pub fn succeeded(app_name: impl Into<String>, published_ref: Option<String>) -> Self {
        Self { success: true, app_name: app_name.into(), published_ref, error: None }
    }

    pub fn failed(app_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self { success: false, app_name: app_name.into(), published_ref: None, error: Some(error.into()) }
    }
}

/// One external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherits the current one when `None`
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { program: program.into(), args: args.into_iter().map(Into::into).collect(), cwd: None, timeout }
    }

    /// Run inside `cwd` (fluent API)
    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Command line for log and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a command that ran to completion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands (`gh`, `git`, the AI tool)
#[mockall::automock]
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion within its timeout
    ///
    /// # Returns
    /// The captured output, also for a nonzero exit. `CommandNotFound` when
    /// the program is not installed, `Timeout` when it overran and was killed.
    async fn run(&self, spec: &CommandSpec) -> OrchestratorResult<CommandOutput>;
}

/// Source of trend records for the research phase
#[mockall::automock]
#[async_trait::async_trait]
pub trait ResearchSource: Send + Sync {
    /// Collect the current trend set
    ///
    /// # Returns
    /// Trend records in discovery order. An empty vector is a valid answer.
    async fn collect_trends(&self) -> OrchestratorResult<Vec<TrendRecord>>;
}

/// Remote registry of already published projects
#[mockall::automock]
#[async_trait::async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// List up to `limit` existing projects in the configured namespace
    async fn list_projects(&self, limit: usize) -> OrchestratorResult<Vec<ProjectSummary>>;
}

/// Local directory holding one subdirectory per generated project
#[mockall::automock]
#[async_trait::async_trait]
pub trait LocalProjects: Send + Sync {
    /// Scan the projects directory
    ///
    /// # Returns
    /// One entry per subdirectory. A missing directory yields an empty vector.
    async fn scan(&self) -> OrchestratorResult<Vec<LocalProject>>;
}

/// External code generation tool
#[mockall::automock]
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Name the app would receive for this title; used to label failed attempts
    fn planned_app_name(&self, title: &str) -> String;

    /// Build and optionally publish one app
    ///
    /// # Returns
    /// `Ok` with `success = false` for a generation that ran and failed,
    /// `Err` for failures that prevented the run entirely.
    async fn generate(&self, request: &GenerationRequest) -> OrchestratorResult<GenerationOutcome>;
}

/// Durable, capped log of cycle results and duplicate checks
#[mockall::automock]
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a cycle result, dropping the oldest beyond the cap
    async fn append_cycle(&self, result: &CycleResult) -> OrchestratorResult<()>;

    /// Append a duplicate check, dropping the oldest beyond the cap
    async fn append_duplicate_check(&self, check: &DuplicateCheck) -> OrchestratorResult<()>;

    /// Load every stored cycle result, oldest first
    async fn load_cycles(&self) -> OrchestratorResult<Vec<CycleResult>>;

    /// Load every stored duplicate check, oldest first
    async fn load_duplicate_checks(&self) -> OrchestratorResult<Vec<DuplicateCheck>>;
}

/// Anything able to run one complete cycle; the daemon loop drives this
#[mockall::automock]
#[async_trait::async_trait]
pub trait CycleRunner: Send + Sync {
    async fn run_cycle(&self, max_ideas: usize) -> OrchestratorResult<CycleResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that mock traits can be instantiated
    #[tokio::test]
    async fn test_mock_trait_instantiation() {
        let _research = MockResearchSource::new();
        let _registry = MockProjectRegistry::new();
        let _local = MockLocalProjects::new();
        let _generator = MockGenerator::new();
        let _history = MockHistoryStore::new();
        let _runner = MockCycleRunner::new();
        let _commands = MockCommandRunner::new();
    }

    #[test]
    fn test_command_spec_display() {
        let spec = CommandSpec::new("gh", ["repo", "list"], Duration::from_secs(30)).in_dir("/tmp");
        assert_eq!(spec.display(), "gh repo list");
        assert_eq!(spec.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_project_summary_tolerates_null_description() {
        let summaries: Vec<ProjectSummary> =
            serde_json::from_str(r#"[{"name":"alpha","description":null},{"name":"beta"}]"#).unwrap();
        assert_eq!(summaries[0].description, None);
        assert_eq!(summaries[1].name, "beta");
    }

    #[test]
    fn test_generation_outcome_constructors() {
        let ok = GenerationOutcome::succeeded("vibe-app", Some("me/vibe-app".to_string()));
        assert!(ok.success && ok.error.is_none());

        let failed = GenerationOutcome::failed("vibe-app", "boom");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
