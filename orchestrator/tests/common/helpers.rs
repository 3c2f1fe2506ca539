//! Test helpers and builder patterns for orchestrator tests
//!
//! `OrchestratorBuilder` wires mockall mocks for every collaborator with
//! permissive defaults (no trends, empty registry, no local projects, every
//! generation succeeds) that individual tests override.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use orchestrator::traits::{
    GenerationOutcome, GenerationRequest, HistoryStore, MockGenerator, MockLocalProjects, MockProjectRegistry,
    MockResearchSource,
};
use orchestrator::{CycleSettings, DuplicateDetector, InMemoryHistoryStore, Orchestrator};
use shared::{CycleResult, TrendRecord};

/// Orchestrator over mocks and the in-memory history store
pub type TestOrchestrator<H = InMemoryHistoryStore> =
    Orchestrator<MockResearchSource, MockProjectRegistry, MockLocalProjects, MockGenerator, H>;

/// Builder pattern for creating test orchestrators with sensible defaults
pub struct OrchestratorBuilder {
    research: MockResearchSource,
    registry: MockProjectRegistry,
    local: MockLocalProjects,
    generator: MockGenerator,
    settings: CycleSettings,
}

impl OrchestratorBuilder {
    /// Create a new builder with default mock behaviour
    pub fn new() -> Self {
        Self {
            research: MockResearchSource::new(),
            registry: MockProjectRegistry::new(),
            local: MockLocalProjects::new(),
            generator: MockGenerator::new(),
            settings: CycleSettings {
                research_timeout: Duration::from_secs(30),
                generation_timeout: Duration::from_secs(600),
            },
        }
    }

    /// Research returns these trends
    pub fn with_trends(mut self, trends: Vec<TrendRecord>) -> Self {
        self.research.expect_collect_trends().returning(move || Ok(trends.clone()));
        self
    }

    /// Configure the research mock with a setup function
    pub fn with_research<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockResearchSource),
    {
        setup(&mut self.research);
        self
    }

    /// Configure the registry mock with a setup function
    pub fn with_registry<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockProjectRegistry),
    {
        setup(&mut self.registry);
        self
    }

    /// Configure the local projects mock with a setup function
    pub fn with_local<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockLocalProjects),
    {
        setup(&mut self.local);
        self
    }

    /// Configure the generator mock with a setup function
    pub fn with_generator<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockGenerator),
    {
        setup(&mut self.generator);
        self
    }

    pub fn with_settings(mut self, settings: CycleSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build with the in-memory history store
    pub fn build(self) -> TestOrchestrator {
        self.build_with_history(InMemoryHistoryStore::new())
    }

    /// Build with a custom history store
    pub fn build_with_history<H: HistoryStore>(mut self, history: H) -> TestOrchestrator<H> {
        // Catch-all defaults; expectations set by tests were added first and take precedence
        self.research.expect_collect_trends().returning(|| Ok(Vec::new()));
        self.registry.expect_list_projects().returning(|_| Ok(Vec::new()));
        self.local.expect_scan().returning(|| Ok(Vec::new()));
        self.generator.expect_planned_app_name().returning(|title| TestHelpers::app_name(title));
        self.generator.expect_generate().returning(|request| Ok(TestHelpers::success_for(request)));

        let detector = DuplicateDetector::new(self.registry, self.local);
        Orchestrator::new(self.research, detector, self.generator, history).with_settings(self.settings)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Collection of test helper functions
pub struct TestHelpers;

impl TestHelpers {
    /// Deterministic app name for a title
    pub fn app_name(title: &str) -> String {
        let slug: String = title.to_lowercase().chars().map(|c| if c.is_alphanumeric() { c } else { '-' }).collect();
        format!("test-{slug}")
    }

    pub fn success_for(request: &GenerationRequest) -> GenerationOutcome {
        GenerationOutcome::succeeded(Self::app_name(&request.title), Some(format!("octo/{}", Self::app_name(&request.title))))
    }

    pub fn failure_for(request: &GenerationRequest, error: &str) -> GenerationOutcome {
        GenerationOutcome::failed(Self::app_name(&request.title), error)
    }

    /// Hacker News stand-in that lists top stories at once and never answers
    /// item requests
    ///
    /// # Returns
    /// Base URL to hand to `RealResearchSource::with_hn_base_url`.
    pub async fn hacker_news_with_hung_items() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut hung = Vec::new();
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if String::from_utf8_lossy(&buf[..n]).starts_with("GET /topstories.json") {
                    let body = "[101,102,103]";
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                } else {
                    hung.push(socket);
                }
            }
        });

        format!("http://{addr}")
    }

    /// Structural invariants every finished cycle must satisfy
    pub fn assert_cycle_invariants(result: &CycleResult, max_ideas: usize) {
        let failures = result.apps.iter().filter(|a| !a.success).count() as u32;
        assert!(result.apps_generated <= 1, "at most one app per cycle");
        assert!(result.ideas_processed as usize <= max_ideas);
        assert_eq!(
            result.ideas_processed,
            result.apps_generated + result.duplicates_skipped + failures,
            "every processed idea is generated, skipped or failed"
        );
        assert_eq!(result.apps.iter().filter(|a| a.success).count() as u32, result.apps_generated);
        assert!(result.cycle_end >= result.cycle_start);
    }
}
