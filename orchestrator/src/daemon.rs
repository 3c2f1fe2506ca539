//! Daemon loop: run a cycle, sleep, repeat until shutdown

use std::time::Duration;

use chrono::Utc;
use shared::{logging, process_info, ProcessId};
use tokio::sync::mpsc;

use crate::traits::CycleRunner;

/// Default pause after a failed cycle
pub const DEFAULT_FAILURE_BACKOFF: Duration = Duration::from_secs(3600);

/// Scheduling parameters for the daemon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaemonSettings {
    /// Pause between successful cycles
    pub interval: Duration,
    /// Ideas attempted per cycle
    pub max_ideas: usize,
    /// Pause after a cycle that returned an error
    pub failure_backoff: Duration,
}

impl DaemonSettings {
    pub fn new(interval: Duration, max_ideas: usize) -> Self {
        Self { interval, max_ideas, failure_backoff: DEFAULT_FAILURE_BACKOFF }
    }

    pub fn with_failure_backoff(mut self, failure_backoff: Duration) -> Self {
        self.failure_backoff = failure_backoff;
        self
    }

    /// Expected apps per day at one app per cycle
    pub fn apps_per_day(&self) -> f64 {
        let hours = self.interval.as_secs_f64() / 3600.0;
        if hours <= 0.0 {
            return 0.0;
        }
        24.0 / hours
    }
}

/// Run cycles until a shutdown signal arrives
///
/// The signal is only observed between cycles, so an in-flight cycle always
/// completes. A closed channel is not treated as a shutdown request.
///
/// # Returns
/// Number of cycles that were run.
pub async fn run_daemon<C>(runner: &C, settings: DaemonSettings, mut shutdown_rx: mpsc::Receiver<()>) -> usize
where
    C: CycleRunner + ?Sized,
{
    logging::log_startup(
        ProcessId::current(),
        &format!(
            "daemon: one cycle every {:.1}h, {} ideas per cycle (~{:.1} apps/day)",
            settings.interval.as_secs_f64() / 3600.0,
            settings.max_ideas,
            settings.apps_per_day()
        ),
    );

    let mut cycles = 0usize;
    loop {
        cycles += 1;
        process_info!(ProcessId::current(), "🔄 Daemon cycle #{}", cycles);

        let wait = match runner.run_cycle(settings.max_ideas).await {
            Ok(result) => {
                process_info!(
                    ProcessId::current(),
                    "✅ Cycle #{} finished: {} app(s) generated",
                    cycles,
                    result.apps_generated
                );
                settings.interval
            }
            Err(e) => {
                logging::log_error(ProcessId::current(), &format!("Cycle #{cycles}"), &e);
                process_info!(
                    ProcessId::current(),
                    "⏳ Backing off for {}s before retrying",
                    settings.failure_backoff.as_secs()
                );
                settings.failure_backoff
            }
        };

        let next_run = chrono::Duration::from_std(wait).ok().and_then(|d| Utc::now().checked_add_signed(d));
        if let Some(next_run) = next_run {
            process_info!(ProcessId::current(), "😴 Next cycle at {}", next_run.format("%Y-%m-%d %H:%M:%S UTC"));
        }

        tokio::select! {
            biased;
            Some(()) = shutdown_rx.recv() => {
                logging::log_shutdown(ProcessId::current(), "shutdown requested");
                break;
            }
            _ = tokio::time::sleep(wait) => {}
        }
    }

    process_info!(ProcessId::current(), "Daemon stopped after {} cycle(s)", cycles);
    cycles
}
