//! # Blobstore Client
//!
//! Turns HTTP responses of object storage services into [`BlobMetadata`] records.
//!
//! The core of this crate is [`extract_metadata`], which maps one request/response pair into one
//! metadata record. It performs no I/O and can be used with any HTTP stack that exposes
//! [`http`] types. On top of that, [`Client`] offers a `HEAD`-based [`stat`](Client::stat) call
//! that sends the request and runs the extraction on its response.
//!
//! ## Usage
//!
//! ```no_run
//! use blobstore_client::Client;
//!
//! #[tokio::main]
//! # async fn main() -> blobstore_client::Result<()> {
//!     let client = Client::builder("http://localhost:8888/").build()?;
//!     if let Some(metadata) = client.stat("mybucket/myfile.txt").send().await? {
//!         println!("{} is {:?}", metadata.key, metadata.content_type);
//!     }
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod client;
mod error;
mod parse;
mod stat;

pub use blobstore_types::{BlobMetadata, BlobMetadataFactory, MutableBlobMetadata};

pub use client::*;
pub use error::*;
pub use parse::*;
pub use stat::*;
