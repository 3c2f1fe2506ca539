//! Real research collaborator
//!
//! Two independent sub-sources: GitHub trending repositories through the `gh`
//! CLI and Hacker News top stories through its public JSON API. A failing
//! or slow sub-source is logged and contributes nothing. The combined set is
//! snapshotted to `trends.json` in the state directory.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::services::history_store::write_json_atomic;
use crate::services::process::{require_success, RealCommandRunner};
use crate::traits::{CommandRunner, CommandSpec, ResearchSource};
use shared::{process_debug, process_info, process_warn, ProcessId, TrendRecord};

pub const HACKER_NEWS_API: &str = "https://hacker-news.firebaseio.com/v0";
pub const TRENDS_FILE: &str = "trends.json";

/// Trends taken from each sub-source
const PER_SOURCE_LIMIT: usize = 10;
const GITHUB_SEARCH_LIMIT: usize = 20;
const GITHUB_TREND_SCORE: f64 = 8.0;
const HN_TEXT_CHARS: usize = 200;
const HN_MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GithubRepo {
    name: String,
    #[serde(default)]
    description: Option<String>,
    url: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    primary_language: Option<PrimaryLanguage>,
    name_with_owner: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PrimaryLanguage {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct HackerNewsItem {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    score: Option<u64>,
    #[serde(default)]
    time: Option<i64>,
}

/// Snapshot written after every research run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub updated_at: DateTime<Utc>,
    pub trends: Vec<TrendSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub id: String,
    pub source: String,
    pub title: String,
    pub score: f64,
}

impl TrendSnapshot {
    pub fn of(trends: &[TrendRecord], updated_at: DateTime<Utc>) -> Self {
        Self {
            updated_at,
            trends: trends
                .iter()
                .map(|t| TrendSummary { id: t.id.clone(), source: t.source.clone(), title: t.title.clone(), score: t.score })
                .collect(),
        }
    }
}

/// GitHub trending plus Hacker News
pub struct RealResearchSource<C: CommandRunner = RealCommandRunner> {
    runner: C,
    http: reqwest::Client,
    hn_base_url: String,
    /// Budget for each sub-source as a whole and for each call within it
    timeout: Duration,
    /// Directory receiving the trend snapshot; no snapshot when `None`
    state_dir: Option<PathBuf>,
}

impl RealResearchSource<RealCommandRunner> {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(RealCommandRunner::new()).with_state_dir(state_dir)
    }
}

impl<C: CommandRunner> RealResearchSource<C> {
    pub fn with_runner(runner: C) -> Self {
        Self {
            runner,
            http: reqwest::Client::new(),
            hn_base_url: HACKER_NEWS_API.to_string(),
            timeout: Duration::from_secs(30),
            state_dir: None,
        }
    }

    /// Configure the per-call timeout (fluent API)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the Hacker News API root (fluent API)
    pub fn with_hn_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.hn_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Configure where `trends.json` is written (fluent API)
    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(state_dir.into());
        self
    }

    pub async fn github_trending(&self) -> OrchestratorResult<Vec<TrendRecord>> {
        let limit = GITHUB_SEARCH_LIMIT.to_string();
        let spec = CommandSpec::new(
            "gh",
            [
                "search",
                "repos",
                "--sort",
                "stars",
                "--order",
                "desc",
                "--limit",
                limit.as_str(),
                "--json",
                "name,description,url,createdAt,primaryLanguage,nameWithOwner",
            ],
            self.timeout,
        );
        let output = self.runner.run(&spec).await?;
        let stdout = require_success("research.github", &spec, output)?;
        parse_github_trending(&stdout, Utc::now())
    }

    pub async fn hacker_news(&self) -> OrchestratorResult<Vec<TrendRecord>> {
        let ids: Vec<u64> = self
            .http
            .get(format!("{}/topstories.json", self.hn_base_url))
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let now = Utc::now();
        let mut trends = Vec::new();
        for id in ids.into_iter().take(PER_SOURCE_LIMIT) {
            match self.hacker_news_item(id).await {
                Ok(Some(item)) => {
                    if let Some(trend) = hacker_news_trend(item, now) {
                        trends.push(trend);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    process_debug!(ProcessId::current(), source = "research.hackernews", "Skipping story {}: {}", id, e)
                }
            }
        }
        Ok(trends)
    }

    async fn hacker_news_item(&self, id: u64) -> OrchestratorResult<Option<HackerNewsItem>> {
        let item = self
            .http
            .get(format!("{}/item/{}.json", self.hn_base_url, id))
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(item)
    }

    /// Cut a whole sub-source off at the per-source timeout
    async fn bounded<F>(&self, fetch: F, operation: &str) -> OrchestratorResult<Vec<TrendRecord>>
    where
        F: Future<Output = OrchestratorResult<Vec<TrendRecord>>>,
    {
        tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| OrchestratorError::timeout(operation, self.timeout))?
    }

    async fn snapshot(&self, trends: &[TrendRecord]) {
        let Some(state_dir) = &self.state_dir else {
            return;
        };
        let path = state_dir.join(TRENDS_FILE);
        if let Err(e) = write_json_atomic(&path, &TrendSnapshot::of(trends, Utc::now())).await {
            process_warn!(ProcessId::current(), source = "research", "⚠️ Could not write trend snapshot: {}", e);
        }
    }
}

#[async_trait]
impl<C: CommandRunner> ResearchSource for RealResearchSource<C> {
    async fn collect_trends(&self) -> OrchestratorResult<Vec<TrendRecord>> {
        let mut trends = Vec::new();

        match self.bounded(self.github_trending(), "GitHub trending").await {
            Ok(found) => {
                process_info!(ProcessId::current(), "🔍 GitHub trending: {} repositories", found.len());
                trends.extend(found);
            }
            Err(e) => {
                process_warn!(ProcessId::current(), source = "research.github", "⚠️ GitHub trending failed: {}", e)
            }
        }

        match self.bounded(self.hacker_news(), "Hacker News").await {
            Ok(found) => {
                process_info!(ProcessId::current(), "🔍 Hacker News: {} stories", found.len());
                trends.extend(found);
            }
            Err(e) => {
                process_warn!(ProcessId::current(), source = "research.hackernews", "⚠️ Hacker News failed: {}", e)
            }
        }

        self.snapshot(&trends).await;
        Ok(trends)
    }
}

/// Convert `gh search repos` JSON into trends, keeping the first ten
fn parse_github_trending(stdout: &str, now: DateTime<Utc>) -> OrchestratorResult<Vec<TrendRecord>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let repos: Vec<GithubRepo> = serde_json::from_str(stdout)?;
    Ok(repos
        .into_iter()
        .take(PER_SOURCE_LIMIT)
        .map(|repo| {
            let description = repo.description.filter(|d| !d.trim().is_empty()).unwrap_or_else(|| "No description".to_string());
            let tags: BTreeSet<String> = repo.primary_language.map(|l| l.name).into_iter().collect();
            TrendRecord {
                id: format!("gh-{}", repo.name_with_owner.replace('/', "-")),
                source: "github_trending".to_string(),
                title: repo.name,
                description,
                url: repo.url,
                score: GITHUB_TREND_SCORE,
                tags,
                created_at: repo.created_at.unwrap_or(now),
            }
        })
        .collect())
}

/// Convert one story; items without a title are skipped
fn hacker_news_trend(item: HackerNewsItem, now: DateTime<Utc>) -> Option<TrendRecord> {
    let title = item.title.filter(|t| !t.trim().is_empty())?;
    let description = item.text.map(|t| t.chars().take(HN_TEXT_CHARS).collect()).unwrap_or_default();
    let url = item.url.unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", item.id));
    let score = (item.score.unwrap_or(0) as f64 / 100.0).min(HN_MAX_SCORE);
    let created_at = item.time.and_then(|t| DateTime::from_timestamp(t, 0)).unwrap_or(now);

    Some(TrendRecord {
        id: format!("hn-{}", item.id),
        source: "hacker_news".to_string(),
        title,
        description,
        url,
        score,
        tags: BTreeSet::from(["hacker_news".to_string()]),
        created_at,
    })
}
