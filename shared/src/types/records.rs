//! Records exchanged between the research, ranking, duplicate-check and
//! generation stages, and persisted to the history logs.
//!
//! Field names are part of the persisted format and must not be renamed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// An externally sourced signal (topic, repository, story) with a relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub id: String,
    pub source: String,
    pub title: String,
    pub description: String,
    pub url: String,
    /// Open-ended relevance value, observed range 0-10
    pub score: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// Value of a tech stack slot: either a single technology or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TechStackEntry {
    Single(String),
    Many(Vec<String>),
}

impl From<&str> for TechStackEntry {
    fn from(value: &str) -> Self {
        TechStackEntry::Single(value.to_string())
    }
}

impl From<Vec<&str>> for TechStackEntry {
    fn from(values: Vec<&str>) -> Self {
        TechStackEntry::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// An actionable app concept derived from a single trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppIdea {
    pub id: String,
    pub title: String,
    pub description: String,
    pub trend_source_id: String,
    pub features: Vec<String>,
    pub tech_stack: BTreeMap<String, TechStackEntry>,
    pub priority: f64,
    pub is_ai_infused: bool,
    pub ai_capabilities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Where a near-match was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Remote,
    Local,
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::Remote => write!(f, "remote"),
            MatchSource::Local => write!(f, "local"),
        }
    }
}

/// A single existing project that scored above the candidate threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub source: MatchSource,
    pub name: String,
    /// Registry description for remote matches, directory path for local ones
    pub description_or_path: String,
    pub similarity: f64,
}

/// Outcome of one duplicate check for one idea. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCheck {
    pub idea_id: String,
    pub is_duplicate: bool,
    pub similarity_score: f64,
    pub matching_projects: Vec<MatchRecord>,
    pub checked_at: DateTime<Utc>,
}

/// One generation attempt inside a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppAttempt {
    pub idea_id: String,
    pub app_name: String,
    pub success: bool,
    pub published_ref: Option<String>,
    pub error: Option<String>,
}

impl AppAttempt {
    pub fn failed_attempts(attempts: &[AppAttempt]) -> u32 {
        attempts.iter().filter(|attempt| !attempt.success).count() as u32
    }
}

/// Summary of one end-to-end pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub cycle_start: DateTime<Utc>,
    pub cycle_end: DateTime<Utc>,
    #[serde(default)]
    pub duration_seconds: f64,
    pub ideas_processed: u32,
    pub apps_generated: u32,
    pub duplicates_skipped: u32,
    pub apps: Vec<AppAttempt>,
}

impl CycleResult {
    /// Start an empty result; `cycle_end` is stamped on finalize
    pub fn started_at(cycle_start: DateTime<Utc>) -> Self {
        Self {
            cycle_start,
            cycle_end: cycle_start,
            duration_seconds: 0.0,
            ideas_processed: 0,
            apps_generated: 0,
            duplicates_skipped: 0,
            apps: Vec::new(),
        }
    }

    /// Stamp the end of the cycle and derive its duration
    pub fn finish(&mut self, cycle_end: DateTime<Utc>) {
        self.cycle_end = cycle_end;
        self.duration_seconds =
            (cycle_end - self.cycle_start).num_milliseconds() as f64 / 1000.0;
    }

    pub fn failed_attempts(&self) -> u32 {
        AppAttempt::failed_attempts(&self.apps)
    }
}
