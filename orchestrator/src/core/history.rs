//! History retention policy and status aggregation
//!
//! Both logs are append-only and capped: after every write only the most
//! recent `cap` records remain, in insertion order.

use chrono::{DateTime, Utc};
use shared::{CycleResult, DuplicateCheck};
use tokio::sync::Mutex;

use crate::error::OrchestratorResult;
use crate::traits::HistoryStore;

/// Cycle results kept in the history log
pub const CYCLE_HISTORY_CAP: usize = 100;

/// Duplicate checks kept in the duplicate-check log
pub const DUPLICATE_HISTORY_CAP: usize = 1000;

/// Append `record` and drop the oldest entries beyond `cap`
pub fn append_capped<T>(records: &mut Vec<T>, record: T, cap: usize) {
    records.push(record);
    if records.len() > cap {
        let excess = records.len() - cap;
        records.drain(..excess);
    }
}

/// History store kept entirely in memory
///
/// Applies the same caps as the file-backed store; used as a test double
/// and for dry runs.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    cycles: Mutex<Vec<CycleResult>>,
    duplicate_checks: Mutex<Vec<DuplicateCheck>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append_cycle(&self, result: &CycleResult) -> OrchestratorResult<()> {
        let mut cycles = self.cycles.lock().await;
        append_capped(&mut cycles, result.clone(), CYCLE_HISTORY_CAP);
        Ok(())
    }

    async fn append_duplicate_check(&self, check: &DuplicateCheck) -> OrchestratorResult<()> {
        let mut checks = self.duplicate_checks.lock().await;
        append_capped(&mut checks, check.clone(), DUPLICATE_HISTORY_CAP);
        Ok(())
    }

    async fn load_cycles(&self) -> OrchestratorResult<Vec<CycleResult>> {
        Ok(self.cycles.lock().await.clone())
    }

    async fn load_duplicate_checks(&self) -> OrchestratorResult<Vec<DuplicateCheck>> {
        Ok(self.duplicate_checks.lock().await.clone())
    }
}

/// Aggregate counts shown by the `status` command
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub total_cycles: usize,
    pub total_apps_generated: u64,
    pub total_duplicates_skipped: u64,
    pub last_cycle_end: Option<DateTime<Utc>>,
    pub last_cycle_apps: Option<u32>,
}

impl HistorySummary {
    pub fn from_cycles(cycles: &[CycleResult]) -> Self {
        let last = cycles.last();
        Self {
            total_cycles: cycles.len(),
            total_apps_generated: cycles.iter().map(|c| c.apps_generated as u64).sum(),
            total_duplicates_skipped: cycles.iter().map(|c| c.duplicates_skipped as u64).sum(),
            last_cycle_end: last.map(|c| c.cycle_end),
            last_cycle_apps: last.map(|c| c.apps_generated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cycle(minute: u32, apps: u32, duplicates: u32) -> CycleResult {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap();
        let mut result = CycleResult::started_at(start);
        result.apps_generated = apps;
        result.duplicates_skipped = duplicates;
        result.ideas_processed = apps + duplicates;
        result.finish(start + chrono::Duration::seconds(30));
        result
    }

    #[test]
    fn test_append_capped_keeps_most_recent_in_order() {
        let mut records = Vec::new();
        for i in 0..25 {
            append_capped(&mut records, i, 10);
        }
        assert_eq!(records, (15..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_append_capped_below_cap_keeps_everything() {
        let mut records = vec![1, 2];
        append_capped(&mut records, 3, 10);
        assert_eq!(records, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_in_memory_store_enforces_cycle_cap() {
        let store = InMemoryHistoryStore::new();
        for i in 0..(CYCLE_HISTORY_CAP + 5) {
            let mut result = cycle(0, 0, 0);
            result.ideas_processed = i as u32;
            store.append_cycle(&result).await.unwrap();
        }

        let cycles = store.load_cycles().await.unwrap();
        assert_eq!(cycles.len(), CYCLE_HISTORY_CAP);
        assert_eq!(cycles.first().unwrap().ideas_processed, 5);
        assert_eq!(cycles.last().unwrap().ideas_processed, (CYCLE_HISTORY_CAP + 4) as u32);
    }

    #[test]
    fn test_summary_totals_and_last_cycle() {
        let cycles = vec![cycle(0, 1, 2), cycle(5, 0, 1), cycle(10, 1, 0)];

        let summary = HistorySummary::from_cycles(&cycles);

        assert_eq!(summary.total_cycles, 3);
        assert_eq!(summary.total_apps_generated, 2);
        assert_eq!(summary.total_duplicates_skipped, 3);
        assert_eq!(summary.last_cycle_end, Some(cycles[2].cycle_end));
        assert_eq!(summary.last_cycle_apps, Some(1));
    }

    #[test]
    fn test_summary_of_empty_history() {
        let summary = HistorySummary::from_cycles(&[]);
        assert_eq!(summary.total_cycles, 0);
        assert!(summary.last_cycle_end.is_none());
    }
}
