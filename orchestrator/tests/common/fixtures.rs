//! Test fixtures and data for orchestrator tests
//!
//! Consistent trends and existing-project sets used across the test suites.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use orchestrator::traits::{LocalProject, ProjectSummary};
use shared::TrendRecord;

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const DEFAULT_MAX_IDEAS: usize = 5;

    /// Build a trend with a fixed timestamp
    pub fn trend(id: &str, title: &str, description: &str, score: f64) -> TrendRecord {
        TrendRecord {
            id: id.to_string(),
            source: "test".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            url: format!("https://example.com/{id}"),
            score,
            tags: BTreeSet::new(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    /// Three trends with distinct scores: A (9.0), B (7.0), C (5.0)
    pub fn three_trends() -> Vec<TrendRecord> {
        vec![
            Self::trend("A", "Rust editor", "A blazing fast code editor", 9.0),
            Self::trend("B", "Photo booth", "Take silly photos with friends", 7.0),
            Self::trend("C", "Budget planner", "Plan monthly spending", 5.0),
        ]
    }

    /// A registry project whose name mirrors the top idea's title
    pub fn registry_clone_of_top_idea() -> Vec<ProjectSummary> {
        vec![ProjectSummary {
            name: "Viral App: Rust editor".to_string(),
            description: Some("Simple, addictive app inspired by: A blazing fast code editor".to_string()),
        }]
    }

    /// Registry entries that resemble nothing the fixtures produce
    pub fn unrelated_registry() -> Vec<ProjectSummary> {
        vec![
            ProjectSummary { name: "dotfiles".to_string(), description: None },
            ProjectSummary { name: "zz-archive".to_string(), description: Some("old stuff".to_string()) },
        ]
    }

    pub fn local_project(name: &str, readme: Option<&str>) -> LocalProject {
        LocalProject {
            name: name.to_string(),
            path: PathBuf::from("/projects").join(name),
            readme_excerpt: readme.map(str::to_string),
        }
    }
}
