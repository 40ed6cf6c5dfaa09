// hubsnap-net/src/lib.rs
pub mod catalog;
pub mod http;
pub mod metadata;
pub mod transfer;
pub mod whoami;

pub use catalog::list_files;
pub use http::HubClient;
pub use metadata::{file_metadata, repo_file_metadata};
pub use transfer::{HttpTransferEngine, ProgressFn, TransferEngine, TransferRequest};
pub use whoami::whoami;
