// hubsnap-core/src/lib.rs
pub mod download;
pub mod hub;
pub mod snapshot;

pub use download::DownloadCoordinator;
pub use hub::{Hub, HubBuilder};
pub use snapshot::{snapshot, ProgressSender};
pub use tokio_util::sync::CancellationToken;
