//! Every run of the pipeline reads and writes files in a fixed layout under one root directory.
//! This crate knows that layout, downloads the raw datasets, and implements the one bit of
//! caching the pipeline has: skip a download when the file is already on disk.

#[macro_use]
extern crate log;

mod cache;
mod download;
mod io;
mod paths;

pub use cache::fetch_if_missing;
pub use download::{download_bytes, download_to_file, http_client, USER_AGENT};
pub use io::{file_exists, slurp_file, slurp_string, write_file};
pub use paths::RunPaths;
