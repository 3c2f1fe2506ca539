//! JSON-file history store
//!
//! Each log is a single pretty-printed JSON array. Writers replace the whole
//! file through a temp file and rename, so readers never observe a partial
//! write. A missing or unreadable file counts as an empty log.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::core::history::{append_capped, CYCLE_HISTORY_CAP, DUPLICATE_HISTORY_CAP};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::HistoryStore;
use shared::{decode_records, encode_records, process_debug, process_warn, CycleResult, DuplicateCheck, ProcessId};

pub const HISTORY_FILE: &str = "history.json";
pub const DUPLICATES_FILE: &str = "duplicates.json";

/// Serialize `value` as pretty JSON and atomically replace `path` with it
pub async fn write_json_atomic<T>(path: &Path, value: &T) -> OrchestratorResult<()>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &bytes).await
}

async fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> OrchestratorResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| OrchestratorError::history(path, e.to_string()))?;
    }

    let tmp_path = temp_path(path);
    let mut file = fs::File::create(&tmp_path).await.map_err(|e| OrchestratorError::history(path, e.to_string()))?;
    file.write_all(bytes).await.map_err(|e| OrchestratorError::history(path, e.to_string()))?;
    file.sync_all().await.map_err(|e| OrchestratorError::history(path, e.to_string()))?;
    drop(file);

    fs::rename(&tmp_path, path).await.map_err(|e| OrchestratorError::history(path, e.to_string()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a JSON array of records; missing or corrupt files yield an empty list
pub async fn read_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            process_warn!(ProcessId::current(), source = "history", "⚠️ Cannot read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match decode_records(&bytes) {
        Ok(records) => records,
        Err(e) => {
            process_warn!(
                ProcessId::current(),
                source = "history",
                "⚠️ Ignoring corrupt {}: {}",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Load, append with cap, and atomically rewrite a record log
///
/// Callers serialize concurrent appends to the same file.
pub async fn append_record<T>(path: &Path, record: &T, cap: usize) -> OrchestratorResult<()>
where
    T: Serialize + DeserializeOwned + Clone,
{
    let mut records: Vec<T> = read_records(path).await;
    append_capped(&mut records, record.clone(), cap);
    let bytes = encode_records(&records)?;
    write_bytes_atomic(path, &bytes).await?;
    process_debug!(ProcessId::current(), "💾 {} now holds {} records", path.display(), records.len());
    Ok(())
}

/// History store writing `history.json` and `duplicates.json`
pub struct JsonHistoryStore {
    state_dir: PathBuf,
    /// One writer at a time per file
    cycles_lock: Mutex<()>,
    checks_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self { state_dir: state_dir.into(), cycles_lock: Mutex::new(()), checks_lock: Mutex::new(()) }
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_dir.join(HISTORY_FILE)
    }

    pub fn duplicates_path(&self) -> PathBuf {
        self.state_dir.join(DUPLICATES_FILE)
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn append_cycle(&self, result: &CycleResult) -> OrchestratorResult<()> {
        let _guard = self.cycles_lock.lock().await;
        append_record(&self.history_path(), result, CYCLE_HISTORY_CAP).await
    }

    async fn append_duplicate_check(&self, check: &DuplicateCheck) -> OrchestratorResult<()> {
        let _guard = self.checks_lock.lock().await;
        append_record(&self.duplicates_path(), check, DUPLICATE_HISTORY_CAP).await
    }

    async fn load_cycles(&self) -> OrchestratorResult<Vec<CycleResult>> {
        let _guard = self.cycles_lock.lock().await;
        Ok(read_records(&self.history_path()).await)
    }

    async fn load_duplicate_checks(&self) -> OrchestratorResult<Vec<DuplicateCheck>> {
        let _guard = self.checks_lock.lock().await;
        Ok(read_records(&self.duplicates_path()).await)
    }
}
