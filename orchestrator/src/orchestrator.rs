//! Cycle orchestrator
//!
//! Drives one end-to-end pass per invocation:
//! research → rank → for each idea (duplicate check → generate or skip) →
//! finalize. At most one app is generated successfully per cycle; failed
//! generations are recorded and the loop moves on to the next idea.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use shared::{
    logging, process_debug, process_info, process_warn, AppAttempt, AppIdea, CycleResult, ProcessId, TrendRecord,
};

use crate::{
    core::{ranker, DuplicateDetector},
    error::{OrchestratorError, OrchestratorResult},
    traits::{
        CycleRunner, GenerationRequest, Generator, HistoryStore, LocalProjects, ProjectRegistry, ResearchSource,
    },
};

/// Successful generations allowed per cycle
pub const MAX_APPS_PER_CYCLE: u32 = 1;

/// Default budget for the research phase
pub const DEFAULT_RESEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default budget for one generation run
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeouts applied to the cycle's external calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSettings {
    pub research_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self { research_timeout: DEFAULT_RESEARCH_TIMEOUT, generation_timeout: DEFAULT_GENERATION_TIMEOUT }
    }
}

/// Phases of a single cycle, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Research,
    Rank,
    Process,
    Finalize,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePhase::Research => write!(f, "research"),
            CyclePhase::Rank => write!(f, "rank"),
            CyclePhase::Process => write!(f, "duplicate check & generation"),
            CyclePhase::Finalize => write!(f, "finalize"),
        }
    }
}

/// Main orchestrator that sequences one cycle
pub struct Orchestrator<R, P, L, G, H>
where
    R: ResearchSource,
    P: ProjectRegistry,
    L: LocalProjects,
    G: Generator,
    H: HistoryStore,
{
    /// Injected services
    research: R,
    detector: DuplicateDetector<P, L>,
    generator: G,
    history: H,

    settings: CycleSettings,
}

impl<R, P, L, G, H> Orchestrator<R, P, L, G, H>
where
    R: ResearchSource,
    P: ProjectRegistry,
    L: LocalProjects,
    G: Generator,
    H: HistoryStore,
{
    /// Create new orchestrator with injected dependencies
    pub fn new(research: R, detector: DuplicateDetector<P, L>, generator: G, history: H) -> Self {
        Self { research, detector, generator, history, settings: CycleSettings::default() }
    }

    /// Override the default timeouts (fluent API)
    pub fn with_settings(mut self, settings: CycleSettings) -> Self {
        self.settings = settings;
        self
    }

    /// History store the orchestrator writes to
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Run one complete cycle and persist its result
    ///
    /// Collaborator failures never surface here; the only error is
    /// `CycleNotSaved`, which still carries the finished result.
    pub async fn run_cycle(&self, max_ideas: usize) -> OrchestratorResult<CycleResult> {
        let mut result = CycleResult::started_at(Utc::now());
        logging::log_startup(ProcessId::current(), &format!("cycle at {}", result.cycle_start.to_rfc3339()));

        self.enter(CyclePhase::Research);
        let trends = self.research_trends().await;

        if trends.is_empty() {
            process_warn!(ProcessId::current(), source = "research", "⚠️ No trends found, nothing to do this cycle");
        } else {
            self.enter(CyclePhase::Rank);
            let ideas = ranker::rank(&trends, max_ideas);
            process_info!(ProcessId::current(), "💡 Ranked {} ideas from {} trends", ideas.len(), trends.len());

            self.enter(CyclePhase::Process);
            self.process_ideas(&ideas, &mut result).await;
        }

        self.enter(CyclePhase::Finalize);
        result.finish(Utc::now());
        if let Err(e) = self.history.append_cycle(&result).await {
            return Err(OrchestratorError::CycleNotSaved { result: Box::new(result), message: e.to_string() });
        }

        process_info!(
            ProcessId::current(),
            "🏁 Cycle complete: {} processed, {} generated, {} duplicates skipped, {} failed ({:.1}s)",
            result.ideas_processed,
            result.apps_generated,
            result.duplicates_skipped,
            result.failed_attempts(),
            result.duration_seconds
        );
        Ok(result)
    }

    fn enter(&self, phase: CyclePhase) {
        process_debug!(ProcessId::current(), "▶️ Phase: {}", phase);
    }

    async fn research_trends(&self) -> Vec<TrendRecord> {
        match tokio::time::timeout(self.settings.research_timeout, self.research.collect_trends()).await {
            Ok(Ok(trends)) => trends,
            Ok(Err(e)) => {
                process_warn!(ProcessId::current(), source = "research", "⚠️ Research failed: {}", e);
                Vec::new()
            }
            Err(_) => {
                let e = OrchestratorError::timeout("Research", self.settings.research_timeout);
                process_warn!(ProcessId::current(), source = "research", "⚠️ {}", e);
                Vec::new()
            }
        }
    }

    /// Walk ideas in ranked order until one app is generated
    async fn process_ideas(&self, ideas: &[AppIdea], result: &mut CycleResult) {
        for idea in ideas {
            result.ideas_processed += 1;
            logging::log_progress(ProcessId::current(), "Processing idea", &idea.title);

            let check = self.detector.check(&self.history, &idea.id, &idea.title, &idea.description).await;
            if check.is_duplicate {
                process_info!(ProcessId::current(), "⏭️ Skipping duplicate idea {}", idea.id);
                result.duplicates_skipped += 1;
                continue;
            }

            let attempt = self.attempt_generation(idea).await;
            let succeeded = attempt.success;
            result.apps.push(attempt);

            if succeeded {
                result.apps_generated += 1;
                if result.apps_generated >= MAX_APPS_PER_CYCLE {
                    process_info!(ProcessId::current(), "🎯 Generated {} app this cycle (limit reached)", MAX_APPS_PER_CYCLE);
                    break;
                }
            }
        }
    }

    /// Run the generator for one idea, translating every failure into a
    /// recorded attempt
    async fn attempt_generation(&self, idea: &AppIdea) -> AppAttempt {
        let request = GenerationRequest {
            idea_id: idea.id.clone(),
            title: idea.title.clone(),
            description: idea.description.clone(),
            features: idea.features.clone(),
            is_ai_infused: idea.is_ai_infused,
            ai_capabilities: idea.ai_capabilities.clone(),
        };

        let outcome =
            tokio::time::timeout(self.settings.generation_timeout, self.generator.generate(&request)).await;

        let attempt = match outcome {
            Ok(Ok(outcome)) => AppAttempt {
                idea_id: idea.id.clone(),
                app_name: outcome.app_name,
                success: outcome.success,
                published_ref: outcome.published_ref,
                error: outcome.error,
            },
            Ok(Err(e)) => self.failed_attempt(idea, e.to_string()),
            Err(_) => {
                let e = OrchestratorError::timeout("App generation", self.settings.generation_timeout);
                self.failed_attempt(idea, e.to_string())
            }
        };

        if attempt.success {
            logging::log_success(ProcessId::current(), &format!("App generated: {}", attempt.app_name));
        } else {
            process_warn!(
                ProcessId::current(),
                source = "generator",
                "❌ App generation failed for {}: {}",
                idea.id,
                attempt.error.as_deref().unwrap_or("unknown error")
            );
        }
        attempt
    }

    fn failed_attempt(&self, idea: &AppIdea, error: String) -> AppAttempt {
        AppAttempt {
            idea_id: idea.id.clone(),
            app_name: self.generator.planned_app_name(&idea.title),
            success: false,
            published_ref: None,
            error: Some(error),
        }
    }
}

#[async_trait::async_trait]
impl<R, P, L, G, H> CycleRunner for Orchestrator<R, P, L, G, H>
where
    R: ResearchSource,
    P: ProjectRegistry,
    L: LocalProjects,
    G: Generator,
    H: HistoryStore,
{
    async fn run_cycle(&self, max_ideas: usize) -> OrchestratorResult<CycleResult> {
        Orchestrator::run_cycle(self, max_ideas).await
    }
}
