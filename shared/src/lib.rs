//! Shared types for the vibe coder system
//!
//! Contains the records passed between pipeline stages and persisted to the
//! history logs, plus the logging conventions every component follows.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
