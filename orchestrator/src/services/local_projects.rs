//! Local projects directory: duplicate-check scan and `list`/`status` views

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;

use crate::core::duplicates::README_EXCERPT_CHARS;
use crate::error::OrchestratorResult;
use crate::traits::{LocalProject, LocalProjects};
use shared::{process_debug, ProcessId};

const README_FILE: &str = "README.md";

/// One generated project as shown by the `list` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListing {
    pub name: String,
    pub path: PathBuf,
    /// First markdown heading of the readme, without the leading `#`s
    pub headline: Option<String>,
}

/// Projects directory with one subdirectory per app
pub struct FsLocalProjects {
    projects_dir: PathBuf,
}

struct ProjectDir {
    name: String,
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl FsLocalProjects {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self { projects_dir: projects_dir.into() }
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    /// Every project directory with its readme headline, sorted by name
    pub async fn list(&self) -> OrchestratorResult<Vec<ProjectListing>> {
        let mut listings = Vec::new();
        for dir in self.project_dirs().await? {
            let headline = read_readme(&dir.path).await.as_deref().and_then(readme_headline);
            listings.push(ProjectListing { name: dir.name, path: dir.path, headline });
        }
        Ok(listings)
    }

    /// Names of the `count` most recently modified project directories, newest first
    pub async fn recent(&self, count: usize) -> OrchestratorResult<Vec<String>> {
        let mut dirs = self.project_dirs().await?;
        // Stable sort keeps name order among equal timestamps
        dirs.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(dirs.into_iter().take(count).map(|d| d.name).collect())
    }

    async fn project_dirs(&self) -> OrchestratorResult<Vec<ProjectDir>> {
        let mut entries = match fs::read_dir(&self.projects_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_dir() {
                continue;
            }
            dirs.push(ProjectDir {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                modified: metadata.modified().ok(),
            });
        }
        dirs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dirs)
    }
}

#[async_trait]
impl LocalProjects for FsLocalProjects {
    async fn scan(&self) -> OrchestratorResult<Vec<LocalProject>> {
        let dirs = self.project_dirs().await?;
        let mut projects = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let readme_excerpt =
                read_readme(&dir.path).await.map(|text| text.chars().take(README_EXCERPT_CHARS).collect());
            projects.push(LocalProject { name: dir.name, path: dir.path, readme_excerpt });
        }
        process_debug!(ProcessId::current(), "📂 Scanned {} local projects", projects.len());
        Ok(projects)
    }
}

async fn read_readme(project_dir: &Path) -> Option<String> {
    fs::read(project_dir.join(README_FILE)).await.ok().map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn readme_headline(readme: &str) -> Option<String> {
    readme
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
}
