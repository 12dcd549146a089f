//! Types shared between blobstore clients and the tools built on top of them.
//!
//! The central type is [`BlobMetadata`], the metadata record describing a single blob. Records are
//! created empty through a [`BlobMetadataFactory`] and then populated from an HTTP response by the
//! extractor in `blobstore-client`. Code that needs a different record shape implements
//! [`MutableBlobMetadata`] for its own type and supplies a matching factory.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod error;
pub mod metadata;

pub use error::*;
pub use metadata::{BlobMetadata, BlobMetadataFactory, MutableBlobMetadata};

/// The header prefix S3-compatible services use for user-defined metadata.
pub const DEFAULT_USER_METADATA_PREFIX: &str = "x-amz-meta-";
