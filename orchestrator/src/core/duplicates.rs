//! Duplicate detection against existing projects
//!
//! Two sources are consulted for every idea: the remote project registry and
//! the local projects directory. Anything scoring above
//! [`CANDIDATE_THRESHOLD`] is kept as evidence; anything above
//! [`DUPLICATE_THRESHOLD`] blocks generation. Scores in between are recorded
//! for audit but never block.

use std::time::Duration;

use chrono::Utc;
use shared::{process_debug, process_info, process_warn, DuplicateCheck, MatchRecord, MatchSource, ProcessId};

use super::similarity::score;
use crate::traits::{HistoryStore, LocalProject, LocalProjects, ProjectRegistry, ProjectSummary};

/// Minimum similarity for a project to be recorded as a near-match
pub const CANDIDATE_THRESHOLD: f64 = 0.5;

/// Similarity above which an idea is treated as a duplicate
pub const DUPLICATE_THRESHOLD: f64 = 0.7;

/// Maximum number of registry entries examined per check
pub const REGISTRY_LIMIT: usize = 100;

/// Leading readme characters compared against the idea description
pub const README_EXCERPT_CHARS: usize = 500;

/// Default timeout for each source lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// What one source contributed to a check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceVerdict {
    pub is_duplicate: bool,
    pub matches: Vec<MatchRecord>,
    pub max_similarity: f64,
}

impl SourceVerdict {
    fn record(&mut self, record: MatchRecord) {
        self.max_similarity = self.max_similarity.max(record.similarity);
        self.is_duplicate = self.max_similarity > DUPLICATE_THRESHOLD;
        self.matches.push(record);
    }
}

/// Score registry entries against an idea
pub fn score_registry(projects: &[ProjectSummary], title: &str, description: &str) -> SourceVerdict {
    let mut verdict = SourceVerdict::default();

    for project in projects.iter().take(REGISTRY_LIMIT) {
        let project_description = project.description.as_deref().unwrap_or_default();
        let similarity = score(title, &project.name).max(score(description, project_description));

        if similarity > CANDIDATE_THRESHOLD {
            verdict.record(MatchRecord {
                source: MatchSource::Remote,
                name: project.name.clone(),
                description_or_path: project_description.to_string(),
                similarity,
            });
        }
    }

    verdict
}

/// Score local project directories against an idea
pub fn score_local(projects: &[LocalProject], title: &str, description: &str) -> SourceVerdict {
    let mut verdict = SourceVerdict::default();

    for project in projects {
        let name_similarity = score(title, &project.name);
        let readme_similarity = project
            .readme_excerpt
            .as_deref()
            .map(|readme| {
                let excerpt: String = readme.chars().take(README_EXCERPT_CHARS).collect();
                score(description, &excerpt)
            })
            .unwrap_or(0.0);
        let similarity = name_similarity.max(readme_similarity);

        if similarity > CANDIDATE_THRESHOLD {
            verdict.record(MatchRecord {
                source: MatchSource::Local,
                name: project.name.clone(),
                description_or_path: project.path.display().to_string(),
                similarity,
            });
        }
    }

    verdict
}

/// Combine both sources into a check; remote evidence comes first
pub fn combine(idea_id: &str, remote: SourceVerdict, local: SourceVerdict) -> DuplicateCheck {
    let mut matching_projects = remote.matches;
    matching_projects.extend(local.matches);

    DuplicateCheck {
        idea_id: idea_id.to_string(),
        is_duplicate: remote.is_duplicate || local.is_duplicate,
        similarity_score: remote.max_similarity.max(local.max_similarity),
        matching_projects,
        checked_at: Utc::now(),
    }
}

/// Checks ideas against the registry and the local projects directory
pub struct DuplicateDetector<P, L>
where
    P: ProjectRegistry,
    L: LocalProjects,
{
    registry: P,
    local: L,
    lookup_timeout: Duration,
}

impl<P, L> DuplicateDetector<P, L>
where
    P: ProjectRegistry,
    L: LocalProjects,
{
    pub fn new(registry: P, local: L) -> Self {
        Self { registry, local, lookup_timeout: DEFAULT_LOOKUP_TIMEOUT }
    }

    /// Configure the per-source lookup timeout (fluent API)
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Run a full check and append it to the history before returning
    ///
    /// Never fails: a source that errors or times out contributes nothing,
    /// and a failed history write is logged.
    pub async fn check<H>(&self, history: &H, idea_id: &str, title: &str, description: &str) -> DuplicateCheck
    where
        H: HistoryStore + ?Sized,
    {
        process_debug!(ProcessId::current(), "🔍 Checking duplicates for: {}", preview(title));

        let remote = self.check_registry(title, description).await;
        let local = self.check_local(title, description).await;
        let check = combine(idea_id, remote, local);

        if let Err(e) = history.append_duplicate_check(&check).await {
            process_warn!(ProcessId::current(), source = "history", "⚠️ Could not record duplicate check: {}", e);
        }

        if check.is_duplicate {
            process_info!(
                ProcessId::current(),
                "⚠️ DUPLICATE DETECTED (similarity: {:.2})",
                check.similarity_score
            );
            for found in &check.matching_projects {
                process_info!(
                    ProcessId::current(),
                    "   - {}: {} ({:.2})",
                    found.source,
                    found.name,
                    found.similarity
                );
            }
        } else {
            process_info!(
                ProcessId::current(),
                "✅ No duplicates found (max similarity: {:.2})",
                check.similarity_score
            );
        }

        check
    }

    async fn check_registry(&self, title: &str, description: &str) -> SourceVerdict {
        match tokio::time::timeout(self.lookup_timeout, self.registry.list_projects(REGISTRY_LIMIT)).await {
            Ok(Ok(projects)) => score_registry(&projects, title, description),
            Ok(Err(e)) => {
                process_warn!(ProcessId::current(), source = "registry", "⚠️ Registry check error: {}", e);
                SourceVerdict::default()
            }
            Err(_) => {
                process_warn!(
                    ProcessId::current(),
                    source = "registry",
                    "⚠️ Registry check timed out after {}s",
                    self.lookup_timeout.as_secs()
                );
                SourceVerdict::default()
            }
        }
    }

    async fn check_local(&self, title: &str, description: &str) -> SourceVerdict {
        match tokio::time::timeout(self.lookup_timeout, self.local.scan()).await {
            Ok(Ok(projects)) => score_local(&projects, title, description),
            Ok(Err(e)) => {
                process_warn!(ProcessId::current(), source = "local", "⚠️ Local project scan error: {}", e);
                SourceVerdict::default()
            }
            Err(_) => {
                process_warn!(
                    ProcessId::current(),
                    source = "local",
                    "⚠️ Local project scan timed out after {}s",
                    self.lookup_timeout.as_secs()
                );
                SourceVerdict::default()
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
