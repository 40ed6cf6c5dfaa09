// hubsnap-common/src/lib.rs
pub mod cache;
pub mod config;
pub mod error;
pub mod model;

// Re-export key types
pub use cache::Cache;
pub use config::Config;
pub use error::{HubError, Result};
pub use model::{FileMetadata, HubIdentity, ProgressTracker, RepoId, RepoKind, SnapshotProgress};
