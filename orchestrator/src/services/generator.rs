//! Real app generator
//!
//! Runs the configured AI coding tool in a fresh project directory, falling
//! back to a built-in template app when the tool is missing or fails. The
//! result is committed to a local git repository and optionally published
//! with `gh repo create`. Every run is appended to `generations.json`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use crate::config::GeneratorConfig;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::services::history_store::append_record;
use crate::services::process::RealCommandRunner;
use crate::traits::{CommandRunner, CommandSpec, GenerationOutcome, GenerationRequest, Generator};
use shared::{process_debug, process_info, process_warn, ProcessId};

pub const GENERATIONS_FILE: &str = "generations.json";
pub const GENERATION_LOG_CAP: usize = 1000;

const MAX_NAME_CHARS: usize = 50;
const GIT_TIMEOUT: Duration = Duration::from_secs(60);
const COMMIT_MESSAGE: &str = "Initial commit: Vibe-coded app";

/// One line of `generations.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub idea_id: String,
    pub app_name: String,
    pub app_path: PathBuf,
    pub success: bool,
    pub files_created: Vec<String>,
    pub published_ref: Option<String>,
    pub error: Option<String>,
    pub duration_seconds: f64,
    pub generated_at: DateTime<Utc>,
}

/// Lowercase, non-alphanumerics to `-`, dash runs collapsed, at most 50 chars
pub fn sanitize_name(title: &str) -> String {
    let replaced: String =
        title.to_lowercase().chars().map(|c| if c.is_alphanumeric() { c } else { '-' }).collect();
    let collapsed = replaced.split('-').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("-");
    collapsed.chars().take(MAX_NAME_CHARS).collect()
}

/// Generator driving an external AI tool through `gh`/`git`
pub struct CliGenerator<C: CommandRunner = RealCommandRunner> {
    runner: C,
    projects_dir: PathBuf,
    logs_dir: PathBuf,
    ai_tool: String,
    repo_prefix: String,
    auto_push: bool,
    github_user: Option<String>,
    generation_timeout: Duration,
    publish_timeout: Duration,
    log_lock: Mutex<()>,
}

impl CliGenerator<RealCommandRunner> {
    pub fn new(projects_dir: impl Into<PathBuf>, logs_dir: impl Into<PathBuf>, config: &GeneratorConfig) -> Self {
        Self::with_runner(RealCommandRunner::new(), projects_dir, logs_dir, config)
    }
}

impl<C: CommandRunner> CliGenerator<C> {
    pub fn with_runner(
        runner: C,
        projects_dir: impl Into<PathBuf>,
        logs_dir: impl Into<PathBuf>,
        config: &GeneratorConfig,
    ) -> Self {
        Self {
            runner,
            projects_dir: projects_dir.into(),
            logs_dir: logs_dir.into(),
            ai_tool: config.ai_tool.clone(),
            repo_prefix: config.repo_prefix.clone(),
            auto_push: config.auto_push,
            github_user: None,
            generation_timeout: Duration::from_secs(600),
            publish_timeout: Duration::from_secs(60),
            log_lock: Mutex::new(()),
        }
    }

    /// Owner used in published references (fluent API)
    pub fn with_github_user(mut self, github_user: Option<String>) -> Self {
        self.github_user = github_user;
        self
    }

    /// Configure tool and publish timeouts (fluent API)
    pub fn with_timeouts(mut self, generation: Duration, publish: Duration) -> Self {
        self.generation_timeout = generation;
        self.publish_timeout = publish;
        self
    }

    pub fn generations_path(&self) -> PathBuf {
        self.logs_dir.join(GENERATIONS_FILE)
    }

    async fn build(
        &self,
        request: &GenerationRequest,
        app_name: &str,
        app_path: &Path,
    ) -> OrchestratorResult<(Vec<String>, Option<String>)> {
        fs::create_dir_all(app_path).await?;

        let prompt = build_prompt(request);
        let files = self.run_ai_tool(&prompt, app_name, app_path, request.is_ai_infused).await?;

        self.init_git_repo(app_path).await;
        let published_ref = if self.auto_push { self.publish(app_name, app_path).await } else { None };
        Ok((files, published_ref))
    }

    async fn run_ai_tool(
        &self,
        prompt: &str,
        app_name: &str,
        app_path: &Path,
        is_ai: bool,
    ) -> OrchestratorResult<Vec<String>> {
        let spec = CommandSpec::new(
            self.ai_tool.as_str(),
            ["--prompt".to_string(), prompt.to_string(), "--output".to_string(), app_path.display().to_string()],
            self.generation_timeout,
        );

        process_info!(ProcessId::current(), "🤖 Running {} for {}", self.ai_tool, app_name);
        match self.runner.run(&spec).await {
            Ok(output) if output.success => list_files(app_path).await,
            Ok(output) => {
                process_warn!(
                    ProcessId::current(),
                    source = "generator",
                    "⚠️ {} exited with {:?}, using template: {}",
                    self.ai_tool,
                    output.status_code,
                    output.stderr.trim()
                );
                write_template_app(app_path, app_name, is_ai).await
            }
            Err(OrchestratorError::Timeout { .. }) => Err(OrchestratorError::GenerationError {
                message: format!("{} timed out after {}s", self.ai_tool, self.generation_timeout.as_secs()),
            }),
            Err(OrchestratorError::CommandNotFound { command }) => {
                process_warn!(ProcessId::current(), source = "generator", "⚠️ {} not installed, creating template app", command);
                write_template_app(app_path, app_name, is_ai).await
            }
            Err(e) => {
                process_warn!(ProcessId::current(), source = "generator", "⚠️ {} failed, using template: {}", self.ai_tool, e);
                write_template_app(app_path, app_name, is_ai).await
            }
        }
    }

    async fn init_git_repo(&self, app_path: &Path) {
        let steps: [&[&str]; 3] = [&["init"], &["add", "."], &["commit", "-m", COMMIT_MESSAGE]];
        for args in steps {
            let spec = CommandSpec::new("git", args.iter().copied(), GIT_TIMEOUT).in_dir(app_path);
            match self.runner.run(&spec).await {
                Ok(output) if output.success => {}
                Ok(output) => {
                    process_warn!(ProcessId::current(), source = "generator", "⚠️ '{}' failed: {}", spec.display(), output.stderr.trim());
                    return;
                }
                Err(e) => {
                    process_warn!(ProcessId::current(), source = "generator", "⚠️ '{}' failed: {}", spec.display(), e);
                    return;
                }
            }
        }
        process_debug!(ProcessId::current(), "📦 Initialized git repo in {}", app_path.display());
    }

    /// Publish to the registry; failures are logged and yield no reference
    async fn publish(&self, app_name: &str, app_path: &Path) -> Option<String> {
        let source = app_path.display().to_string();
        let spec = CommandSpec::new(
            "gh",
            ["repo", "create", app_name, "--public", "--source", source.as_str(), "--push"],
            self.publish_timeout,
        )
        .in_dir(app_path);

        match self.runner.run(&spec).await {
            Ok(output) if output.success => {
                let published = match &self.github_user {
                    Some(user) => format!("{user}/{app_name}"),
                    None => output
                        .stdout
                        .lines()
                        .map(str::trim)
                        .rfind(|line| !line.is_empty())
                        .unwrap_or(app_name)
                        .to_string(),
                };
                process_info!(ProcessId::current(), "🚀 Published {}", published);
                Some(published)
            }
            Ok(output) => {
                process_warn!(ProcessId::current(), source = "generator", "⚠️ Publish failed: {}", output.stderr.trim());
                None
            }
            Err(e) => {
                process_warn!(ProcessId::current(), source = "generator", "⚠️ Publish failed: {}", e);
                None
            }
        }
    }

    async fn record(&self, record: &GenerationRecord) {
        let _guard = self.log_lock.lock().await;
        if let Err(e) = append_record(&self.generations_path(), record, GENERATION_LOG_CAP).await {
            process_warn!(ProcessId::current(), source = "generator", "⚠️ Could not update generation log: {}", e);
        }
    }
}

#[async_trait]
impl<C: CommandRunner> Generator for CliGenerator<C> {
    fn planned_app_name(&self, title: &str) -> String {
        format!("{}{}", self.repo_prefix, sanitize_name(title))
    }

    async fn generate(&self, request: &GenerationRequest) -> OrchestratorResult<GenerationOutcome> {
        let started = Instant::now();
        let app_name = self.planned_app_name(&request.title);
        let app_path = self.projects_dir.join(&app_name);

        process_info!(
            ProcessId::current(),
            "🚀 Generating {} ({})",
            app_name,
            if request.is_ai_infused { "AI-infused" } else { "viral" }
        );

        let (outcome, files) = match self.build(request, &app_name, &app_path).await {
            Ok((files, published_ref)) => (GenerationOutcome::succeeded(&app_name, published_ref), files),
            Err(e) => (GenerationOutcome::failed(&app_name, e.to_string()), Vec::new()),
        };

        self.record(&GenerationRecord {
            idea_id: request.idea_id.clone(),
            app_name: app_name.clone(),
            app_path,
            success: outcome.success,
            files_created: files,
            published_ref: outcome.published_ref.clone(),
            error: outcome.error.clone(),
            duration_seconds: started.elapsed().as_secs_f64(),
            generated_at: Utc::now(),
        })
        .await;

        Ok(outcome)
    }
}

/// Prompt handed to the AI tool; the AI section only appears for AI ideas
pub fn build_prompt(request: &GenerationRequest) -> String {
    let features = request.features.iter().map(|f| format!("- {f}")).collect::<Vec<_>>().join("\n");
    let ai_section = if request.is_ai_infused && !request.ai_capabilities.is_empty() {
        let capabilities =
            request.ai_capabilities.iter().map(|c| format!("- {c}")).collect::<Vec<_>>().join("\n");
        format!(
            "\n**AI Capabilities to Implement**:\n{capabilities}\n\n\
             **AI Integration Requirements**:\n\
             1. Use LangChain or similar framework for AI orchestration\n\
             2. Implement an AI service layer for model inference\n\
             3. Add prompt templates for AI interactions\n\
             4. Include fallback responses when AI is unavailable\n\
             5. Add rate limiting for AI API calls\n"
        )
    } else {
        String::new()
    };
    let app_type = if request.is_ai_infused { "AI-Infused Application with intelligent features" } else { "Viral Web Application" };
    let ai_stack = if request.is_ai_infused { "- AI: LangChain for orchestration, API integration for LLM access\n" } else { "" };

    format!(
        "You are an expert full-stack developer. Build a complete, production-ready web application.\n\n\
         ## App Requirements\n\n\
         **Title**: {title}\n\
         **Description**: {description}\n\
         **Type**: {app_type}\n\n\
         **Features to implement**:\n{features}\n{ai_section}\n\
         **Tech Stack**:\n\
         - Frontend: React with modern hooks\n\
         - Backend: Node.js with Express\n\
         - Database: SQLite for simplicity\n\
         {ai_stack}\n\
         **Requirements**:\n\
         1. Create a complete, runnable application\n\
         2. Include package.json with all dependencies\n\
         3. Create a README.md with setup instructions\n\
         4. Add error handling\n\n\
         Generate all necessary files to make this app fully functional.\n",
        title = request.title,
        description = request.description,
    )
}

/// Write the fallback app and return the created paths relative to `app_path`
async fn write_template_app(app_path: &Path, app_name: &str, is_ai: bool) -> OrchestratorResult<Vec<String>> {
    let mut dependencies = serde_json::json!({
        "express": "^4.18.2",
        "cors": "^2.8.5",
        "better-sqlite3": "^9.0.0"
    });
    if is_ai {
        dependencies["langchain"] = "^0.1.0".into();
        dependencies["openai"] = "^4.20.0".into();
        dependencies["dotenv"] = "^16.3.0".into();
    }
    let description = if is_ai { "AI-powered vibe-coded app" } else { "Vibe-coded app" };
    let package = serde_json::json!({
        "name": app_name,
        "version": "1.0.0",
        "description": description,
        "main": "server.js",
        "scripts": { "start": "node server.js", "dev": "nodemon server.js" },
        "dependencies": dependencies,
        "devDependencies": { "nodemon": "^3.0.0" }
    });

    let mut files: Vec<(&str, String)> = vec![
        ("package.json", serde_json::to_string_pretty(&package)?),
        ("server.js", SERVER_JS.to_string()),
        ("README.md", template_readme(app_name, is_ai)),
        (".gitignore", GITIGNORE.to_string()),
    ];
    if is_ai {
        files.push(("services/ai-service.js", AI_SERVICE_JS.to_string()));
        files.push((".env.example", ENV_EXAMPLE.to_string()));
    }

    let mut created = Vec::with_capacity(files.len());
    for (relative, content) in files {
        let path = app_path.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        created.push(relative.to_string());
    }
    Ok(created)
}

fn template_readme(app_name: &str, is_ai: bool) -> String {
    let app_type = if is_ai { "AI-powered " } else { "" };
    let ai_stack = if is_ai { "- LangChain (AI Orchestration)\n- OpenAI-compatible API (AI Models)\n" } else { "" };
    format!(
        "# {app_name}\n\n{app_type}Vibe-coded application generated by Vibe Coder.\n\n\
         ## Quick Start\n\n```bash\nnpm install\nnpm start\n```\n\n\
         ## API Endpoints\n\n- `GET /api/items` - Get all items\n- `POST /api/items` - Create new item\n\n\
         ## Tech Stack\n\n- Express.js (Backend)\n- SQLite (Database)\n{ai_stack}"
    )
}

/// Files under `dir`, relative and sorted, skipping `.git`
async fn list_files(dir: &Path) -> OrchestratorResult<Vec<String>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                if entry.file_name() != ".git" {
                    pending.push(path);
                }
            } else if let Ok(relative) = path.strip_prefix(dir) {
                files.push(relative.to_string_lossy().into_owned());
            }
        }
    }
    files.sort();
    Ok(files)
}

const SERVER_JS: &str = r#"const express = require('express');
const cors = require('cors');
const Database = require('better-sqlite3');

const app = express();
const PORT = process.env.PORT || 3000;

app.use(cors());
app.use(express.json());

const db = new Database('./app.db');
db.exec(`
  CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
  )
`);

app.get('/api/items', (req, res) => {
  res.json(db.prepare('SELECT * FROM items').all());
});

app.post('/api/items', (req, res) => {
  const { name, description } = req.body;
  const result = db.prepare('INSERT INTO items (name, description) VALUES (?, ?)').run(name, description);
  res.json({ id: result.lastInsertRowid, name, description });
});

app.listen(PORT, () => {
  console.log(`Server running on http://localhost:${PORT}`);
});
"#;

const AI_SERVICE_JS: &str = r#"class AIService {
  constructor() {
    this.apiKey = process.env.OPENAI_API_KEY;
    this.enabled = !!this.apiKey;
  }

  async generate(prompt) {
    if (!this.enabled) {
      return { success: true, fallback: true, data: { message: 'AI temporarily unavailable.' } };
    }
    return { success: true, data: { message: 'AI response placeholder' } };
  }
}

module.exports = new AIService();
"#;

const ENV_EXAMPLE: &str = "OPENAI_API_KEY=\n\nPORT=3000\nNODE_ENV=development\n";

const GITIGNORE: &str = "node_modules/\n*.db\n.DS_Store\n.env\n";

#[cfg(test)]
mod tests {
    use super::*;

    fn request(is_ai: bool) -> GenerationRequest {
        GenerationRequest {
            idea_id: "ai-idea-gh-x".to_string(),
            title: "AI-Powered: Photo Booth".to_string(),
            description: "Take pictures".to_string(),
            features: vec!["Filters".to_string(), "Sharing".to_string()],
            is_ai_infused: is_ai,
            ai_capabilities: if is_ai { vec!["Computer vision".to_string(), "CV".to_string()] } else { vec![] },
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("AI-Powered: Photo Booth!!"), "ai-powered-photo-booth");
        assert_eq!(sanitize_name("  --Hello   World--  "), "hello-world");
        assert_eq!(sanitize_name(&"a".repeat(80)).len(), 50);
        assert_eq!(sanitize_name("!!!"), "");
    }

    #[test]
    fn test_prompt_ai_section_only_for_ai_ideas() {
        let ai = build_prompt(&request(true));
        assert!(ai.contains("**AI Capabilities to Implement**"));
        assert!(ai.contains("- Computer vision"));
        assert!(ai.contains("- Filters"));

        let viral = build_prompt(&request(false));
        assert!(!viral.contains("AI Capabilities"));
        assert!(viral.contains("Viral Web Application"));
    }
}
