//! Test utilities for blobstore crates.
//!
//! This crate provides utilities to facilitate testing of the blobstore client and tools. See the
//! modules for all available utilities.

pub mod server;
pub mod tracing;
