//! Inspects blob metadata of an object storage service.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

fn main() -> anyhow::Result<()> {
    blobstore_cli::cli::execute()
}
