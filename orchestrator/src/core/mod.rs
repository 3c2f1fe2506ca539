//! Core business logic modules
//!
//! Scoring, ranking and retention policy. Everything here is deterministic;
//! the only I/O goes through the collaborator traits.

pub mod duplicates;
pub mod history;
pub mod ranker;
pub mod similarity;

pub use duplicates::DuplicateDetector;
pub use history::{HistorySummary, InMemoryHistoryStore};
pub use ranker::rank;
