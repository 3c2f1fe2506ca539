//! Remote project registry backed by the `gh` CLI

use std::time::Duration;

use async_trait::async_trait;

use crate::error::OrchestratorResult;
use crate::services::process::{require_success, RealCommandRunner};
use crate::traits::{CommandRunner, CommandSpec, ProjectRegistry, ProjectSummary};

pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(30);

/// Lists repositories with `gh repo list`
pub struct GhProjectRegistry<C: CommandRunner = RealCommandRunner> {
    runner: C,
    /// Namespace to list; the authenticated account when `None`
    github_user: Option<String>,
    timeout: Duration,
}

impl GhProjectRegistry<RealCommandRunner> {
    pub fn new(github_user: Option<String>) -> Self {
        Self::with_runner(RealCommandRunner::new(), github_user)
    }
}

impl<C: CommandRunner> GhProjectRegistry<C> {
    pub fn with_runner(runner: C, github_user: Option<String>) -> Self {
        Self { runner, github_user, timeout: DEFAULT_REGISTRY_TIMEOUT }
    }

    /// Configure the command timeout (fluent API)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, limit: usize) -> CommandSpec {
        let mut args = vec!["repo".to_string(), "list".to_string()];
        if let Some(user) = &self.github_user {
            args.push(user.clone());
        }
        args.extend(["--limit".to_string(), limit.to_string(), "--json".to_string(), "name,description".to_string()]);
        CommandSpec::new("gh", args, self.timeout)
    }
}

#[async_trait]
impl<C: CommandRunner> ProjectRegistry for GhProjectRegistry<C> {
    async fn list_projects(&self, limit: usize) -> OrchestratorResult<Vec<ProjectSummary>> {
        let spec = self.command(limit);
        let output = self.runner.run(&spec).await?;
        let stdout = require_success("registry", &spec, output)?;
        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut projects: Vec<ProjectSummary> = serde_json::from_str(&stdout)?;
        projects.truncate(limit);
        Ok(projects)
    }
}
