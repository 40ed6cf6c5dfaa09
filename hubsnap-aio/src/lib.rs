// hubsnap-aio/src/lib.rs
//! Asynchronous IO helpers for hubsnap (directory setup, atomic file finalisation, json)

pub mod fs;
pub mod json_io;

pub use fs::{
    create_dir_all, create_parent_dirs, finalize_download, remove_file_if_exists,
    temp_download_path,
};
pub use json_io::{read_json_async, read_json_object_async};
