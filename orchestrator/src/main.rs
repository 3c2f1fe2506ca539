//! Entry point for the `vibe-coder` binary
//!
//! Wires the real collaborator services into the orchestrator and dispatches
//! the `run`, `daemon`, `status` and `list` commands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::mpsc;

use orchestrator::{
    config::{hours_to_duration, VibeConfig},
    core::{ranker::DEFAULT_MAX_IDEAS, DuplicateDetector, HistorySummary},
    daemon::{run_daemon, DaemonSettings},
    services::{CliGenerator, FsLocalProjects, GhProjectRegistry, JsonHistoryStore, RealResearchSource},
    CycleSettings, HistoryStore, Orchestrator, OrchestratorError,
};
use shared::{logging, process_debug, process_info, CycleResult, ProcessId};

/// Projects shown by `status`
const RECENT_PROJECTS: usize = 5;

/// Autonomous app factory: turns trending topics into generated apps
#[derive(Parser)]
#[command(name = "vibe-coder", version)]
#[command(about = "Researches trends, filters duplicates and generates one new app per cycle")]
pub struct Args {
    /// YAML config file (defaults to config.yaml in the base directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Root for the projects, state and logs directories
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a single cycle (the default)
    Run {
        /// Ideas to attempt this cycle
        #[arg(short = 'n', long)]
        max_ideas: Option<usize>,
    },
    /// Run cycles forever at a fixed interval
    Daemon {
        /// Hours between cycles
        #[arg(short, long)]
        interval: Option<f64>,

        /// Ideas to attempt per cycle
        #[arg(long)]
        max_ideas: Option<usize>,
    },
    /// Show history totals and recent projects
    Status,
    /// List generated projects
    List,
}

type RealOrchestrator =
    Orchestrator<RealResearchSource, GhProjectRegistry, FsLocalProjects, CliGenerator, JsonHistoryStore>;

fn build_orchestrator(config: &VibeConfig) -> RealOrchestrator {
    let timeouts = &config.timeouts;

    let research = RealResearchSource::new(config.state_path()).with_timeout(timeouts.research());
    let registry = GhProjectRegistry::new(config.github_user.clone()).with_timeout(timeouts.registry());
    let local = FsLocalProjects::new(config.projects_path());
    let detector = DuplicateDetector::new(registry, local).with_lookup_timeout(timeouts.registry());
    let generator = CliGenerator::new(config.projects_path(), config.logs_path(), &config.generator)
        .with_github_user(config.github_user.clone())
        .with_timeouts(timeouts.generation(), timeouts.publish());
    let history = JsonHistoryStore::new(config.state_path());

    Orchestrator::new(research, detector, generator, history).with_settings(CycleSettings {
        research_timeout: timeouts.research_total(),
        generation_timeout: timeouts.generation_total(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenv::dotenv().ok();

    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Run { max_ideas: None });

    match command {
        Command::Daemon { .. } => ProcessId::init_daemon(),
        _ => ProcessId::init_runner(),
    };

    logging::init_tracing_with_level(Some(&args.log_level)).context("failed to initialise logging")?;

    let config = VibeConfig::load(args.config.as_deref(), args.base_dir.as_deref()).context("failed to load configuration")?;
    process_debug!(ProcessId::current(), "Configuration: {:?}", config);

    match command {
        Command::Run { max_ideas } => run_once(&config, max_ideas.unwrap_or(config.cycle.max_ideas)).await,
        Command::Daemon { interval, max_ideas } => {
            let interval = match interval {
                Some(hours) => hours_to_duration("--interval", hours)?,
                None => config.interval()?,
            };
            let settings = DaemonSettings::new(interval, max_ideas.unwrap_or(config.cycle.max_ideas))
                .with_failure_backoff(Duration::from_secs(config.cycle.failure_backoff_secs));
            daemon(&config, settings).await
        }
        Command::Status => status(&config).await,
        Command::List => list(&config).await,
    }
}

async fn run_once(config: &VibeConfig, max_ideas: usize) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config);
    match orchestrator.run_cycle(max_ideas).await {
        Ok(result) => {
            print!("{}", cycle_report(&result));
            Ok(())
        }
        Err(OrchestratorError::CycleNotSaved { result, message }) => {
            print!("{}", cycle_report(&result));
            anyhow::bail!("cycle result was not saved to history: {message}")
        }
        Err(e) => Err(e).context("cycle failed"),
    }
}

fn cycle_report(result: &CycleResult) -> String {
    let mut report = format!("Cycle finished in {:.1}s\n", result.duration_seconds);
    report.push_str(&format!("  Ideas processed:    {}\n", result.ideas_processed));
    report.push_str(&format!("  Apps generated:     {}\n", result.apps_generated));
    report.push_str(&format!("  Duplicates skipped: {}\n", result.duplicates_skipped));
    for app in &result.apps {
        let line = match (&app.published_ref, &app.error) {
            (_, Some(error)) => format!("  ✗ {} ({})", app.app_name, error),
            (Some(published), None) => format!("  ✓ {} -> {}", app.app_name, published),
            (None, None) => format!("  ✓ {}", app.app_name),
        };
        report.push_str(&line);
        report.push('\n');
    }
    report
}

async fn daemon(config: &VibeConfig, settings: DaemonSettings) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config);

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal, finishing current cycle");
                let _ = shutdown_tx.send(()).await;
            }
            Err(err) => {
                logging::log_error(ProcessId::current(), "Signal handling", &err);
            }
        }
    });

    let cycles = run_daemon(&orchestrator, settings, shutdown_rx).await;
    logging::log_success(ProcessId::current(), &format!("Daemon stopped gracefully after {cycles} cycle(s)"));
    Ok(())
}

async fn status(config: &VibeConfig) -> anyhow::Result<()> {
    let history = JsonHistoryStore::new(config.state_path());
    let cycles = history.load_cycles().await.context("failed to read history")?;
    let summary = HistorySummary::from_cycles(&cycles);

    println!("Vibe Coder status");
    println!("  Total cycles:        {}", summary.total_cycles);
    println!("  Apps generated:      {}", summary.total_apps_generated);
    println!("  Duplicates skipped:  {}", summary.total_duplicates_skipped);
    match (summary.last_cycle_end, summary.last_cycle_apps) {
        (Some(end), Some(apps)) => {
            println!("  Last cycle:          {} ({} app(s))", end.format("%Y-%m-%d %H:%M:%S UTC"), apps)
        }
        _ => println!("  No cycles run yet"),
    }

    let local = FsLocalProjects::new(config.projects_path());
    let recent = local.recent(RECENT_PROJECTS).await.context("failed to read projects directory")?;
    if !recent.is_empty() {
        println!("\n  Recent apps:");
        for name in recent {
            println!("    - {name}");
        }
    }
    Ok(())
}

async fn list(config: &VibeConfig) -> anyhow::Result<()> {
    let local = FsLocalProjects::new(config.projects_path());
    let projects = local.list().await.context("failed to read projects directory")?;

    if projects.is_empty() {
        println!("No apps generated yet");
        return Ok(());
    }

    println!("Generated apps ({}):", projects.len());
    for project in projects {
        println!("  {}", project.name);
        if let Some(headline) = project.headline {
            println!("    {headline}");
        }
        println!("    {}", project.path.display());
    }
    process_info!(ProcessId::current(), "Listed projects in {}", local.projects_dir().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let args = Args::try_parse_from(["vibe-coder"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_run_flags() {
        let args = Args::try_parse_from(["vibe-coder", "run", "-n", "3", "--log-level", "debug"]).unwrap();
        assert!(matches!(args.command, Some(Command::Run { max_ideas: Some(3) })));
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn test_daemon_flags() {
        let args = Args::try_parse_from(["vibe-coder", "--base-dir", "/srv", "daemon", "-i", "2.5"]).unwrap();
        assert_eq!(args.base_dir, Some(PathBuf::from("/srv")));
        match args.command {
            Some(Command::Daemon { interval, max_ideas }) => {
                assert_eq!(interval, Some(2.5));
                assert_eq!(max_ideas, None);
            }
            _ => panic!("expected daemon command"),
        }
    }

    #[test]
    fn test_cycle_report_lists_counts_and_attempts() {
        let mut result = CycleResult::started_at(chrono::Utc::now());
        result.ideas_processed = 2;
        result.apps_generated = 1;
        result.apps = vec![
            shared::AppAttempt {
                idea_id: "viral-idea-a".to_string(),
                app_name: "vibe-a".to_string(),
                success: false,
                published_ref: None,
                error: Some("tool crashed".to_string()),
            },
            shared::AppAttempt {
                idea_id: "ai-idea-b".to_string(),
                app_name: "vibe-b".to_string(),
                success: true,
                published_ref: Some("octo/vibe-b".to_string()),
                error: None,
            },
        ];

        let report = cycle_report(&result);

        assert!(report.contains("Ideas processed:    2"));
        assert!(report.contains("Apps generated:     1"));
        assert!(report.contains("✗ vibe-a (tool crashed)"));
        assert!(report.contains("✓ vibe-b -> octo/vibe-b"));
    }

    #[test]
    fn test_huge_interval_flag_parses_but_is_rejected() {
        let args = Args::try_parse_from(["vibe-coder", "daemon", "-i", "1e20"]).unwrap();
        match args.command {
            Some(Command::Daemon { interval: Some(hours), .. }) => {
                assert!(hours_to_duration("--interval", hours).is_err());
            }
            _ => panic!("expected daemon command"),
        }
    }

    #[test]
    fn test_default_max_ideas_matches_config_default() {
        assert_eq!(VibeConfig::default().cycle.max_ideas, DEFAULT_MAX_IDEAS);
    }
}
