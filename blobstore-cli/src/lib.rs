//! The `blobstore` command line tool.
//!
//! This wraps [`blobstore_client`] in a small binary that reads the metadata of a single object and
//! prints it as JSON. See [`config`] for how the tool is configured.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cli;
pub mod config;
pub mod observability;
pub mod stat;
