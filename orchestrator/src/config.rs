//! Configuration loading
//!
//! Layering, lowest to highest precedence: built-in defaults, the YAML file,
//! `VIBE_*` environment variables (including those loaded from `.env`), then
//! command-line flags applied by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, OrchestratorResult};

/// Config file looked up in the base directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

pub const ENV_GITHUB_USER: &str = "VIBE_GITHUB_USER";
pub const ENV_INTERVAL: &str = "VIBE_INTERVAL";
pub const ENV_BASE_DIR: &str = "VIBE_BASE_DIR";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VibeConfig {
    /// Registry namespace; `None` lets `gh` use the authenticated account
    pub github_user: Option<String>,
    pub base_dir: PathBuf,
    pub projects_dir: PathBuf,
    pub state_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub generator: GeneratorConfig,
    pub timeouts: TimeoutConfig,
    pub cycle: CycleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Executable invoked to generate app code
    pub ai_tool: String,
    pub repo_prefix: String,
    /// Publish each generated app to the registry
    pub auto_push: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub registry_secs: u64,
    pub generation_secs: u64,
    pub research_secs: u64,
    pub publish_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub max_ideas: usize,
    pub interval_hours: f64,
    pub failure_backoff_secs: u64,
}

impl Default for VibeConfig {
    fn default() -> Self {
        Self {
            github_user: None,
            base_dir: PathBuf::from("."),
            projects_dir: PathBuf::from("projects"),
            state_dir: PathBuf::from("state"),
            logs_dir: PathBuf::from("logs"),
            generator: GeneratorConfig::default(),
            timeouts: TimeoutConfig::default(),
            cycle: CycleConfig::default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { ai_tool: "qwen-code".to_string(), repo_prefix: "vibe-".to_string(), auto_push: true }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { registry_secs: 30, generation_secs: 600, research_secs: 30, publish_secs: 60 }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self { max_ideas: 5, interval_hours: 4.0, failure_backoff_secs: 3600 }
    }
}

impl VibeConfig {
    /// Load configuration for a run
    ///
    /// `config_path` is the `--config` flag: when given the file must exist.
    /// Otherwise `config.yaml` in the base directory is used if present.
    /// `base_dir` is the `--base-dir` flag and wins over every other source.
    pub fn load(config_path: Option<&Path>, base_dir: Option<&Path>) -> OrchestratorResult<Self> {
        let search_base = base_dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_BASE_DIR).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = search_base.join(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        if let Some(base_dir) = base_dir {
            config.base_dir = base_dir.to_path_buf();
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> OrchestratorResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OrchestratorError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> OrchestratorResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `VIBE_*` overrides using `lookup` to read variables
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> OrchestratorResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = lookup(ENV_GITHUB_USER).filter(|u| !u.trim().is_empty()) {
            self.github_user = Some(user.trim().to_string());
        }
        if let Some(raw) = lookup(ENV_INTERVAL) {
            self.cycle.interval_hours = raw
                .trim()
                .parse()
                .map_err(|_| OrchestratorError::config(format!("{ENV_INTERVAL} must be a number of hours, got '{raw}'")))?;
        }
        if let Some(dir) = lookup(ENV_BASE_DIR).filter(|d| !d.trim().is_empty()) {
            self.base_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> OrchestratorResult<()> {
        hours_to_duration("cycle.interval_hours", self.cycle.interval_hours)?;
        if self.generator.ai_tool.trim().is_empty() {
            return Err(OrchestratorError::config("generator.ai_tool must not be empty"));
        }
        Ok(())
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        }
    }

    pub fn projects_path(&self) -> PathBuf {
        self.resolve(&self.projects_dir)
    }

    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.state_dir)
    }

    pub fn logs_path(&self) -> PathBuf {
        self.resolve(&self.logs_dir)
    }

    pub fn interval(&self) -> OrchestratorResult<Duration> {
        hours_to_duration("cycle.interval_hours", self.cycle.interval_hours)
    }
}

/// Convert a positive number of hours into a sleep duration
///
/// `field` names the setting in the error message.
pub fn hours_to_duration(field: &str, hours: f64) -> OrchestratorResult<Duration> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(OrchestratorError::config(format!("{field} must be a positive number of hours, got {hours}")));
    }
    Duration::try_from_secs_f64(hours * 3600.0)
        .map_err(|e| OrchestratorError::config(format!("{field} = {hours} hours is out of range: {e}")))
}

impl TimeoutConfig {
    pub fn registry(&self) -> Duration {
        Duration::from_secs(self.registry_secs)
    }

    pub fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }

    pub fn research(&self) -> Duration {
        Duration::from_secs(self.research_secs)
    }

    pub fn publish(&self) -> Duration {
        Duration::from_secs(self.publish_secs)
    }

    /// Outer budget for the research phase
    ///
    /// Each of the two sub-sources is cut off at `research()`; the third share
    /// covers the trend snapshot write.
    pub fn research_total(&self) -> Duration {
        self.research() * 3
    }

    /// Outer budget for one whole generation: tool run, git and publish
    pub fn generation_total(&self) -> Duration {
        self.generation() + self.publish() + self.registry()
    }
}
