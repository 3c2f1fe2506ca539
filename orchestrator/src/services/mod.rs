//! Service implementations
//!
//! Real implementations of the collaborator traits. These are the production
//! implementations that talk to `gh`, `git`, the AI tool, Hacker News and the
//! local filesystem.

pub mod generator;
pub mod history_store;
pub mod local_projects;
pub mod process;
pub mod registry;
pub mod research;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use generator::CliGenerator;
pub use history_store::JsonHistoryStore;
pub use local_projects::{FsLocalProjects, ProjectListing};
pub use process::RealCommandRunner;
pub use registry::GhProjectRegistry;
pub use research::RealResearchSource;
