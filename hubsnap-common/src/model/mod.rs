// hubsnap-common/src/model/mod.rs
pub mod identity;
pub mod metadata;
pub mod progress;
pub mod repo;

pub use identity::HubIdentity;
pub use metadata::FileMetadata;
pub use progress::{ProgressTracker, SnapshotProgress};
pub use repo::{RepoId, RepoKind};
