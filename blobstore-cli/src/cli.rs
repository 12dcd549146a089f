//! Command line parsing and dispatch.

use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;

use crate::config::Config;
use crate::{observability, stat};

/// Inspect blob metadata of an object storage service.
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the YAML configuration file
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    #[argh(subcommand)]
    pub command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    Stat(StatCommand),
    Version(VersionCommand),
}

/// print the metadata of a single object as JSON
///
/// This sends a HEAD request for the object and fails if the object does not exist or the response
/// carries no Content-Type header.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "stat")]
struct StatCommand {
    /// path of the object, relative to the configured service URL
    #[argh(positional)]
    path: String,
}

/// print the blobstore version
#[derive(Default, Debug, FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCommand {}

/// Bootstrap the runtime and execute the CLI command.
pub fn execute() -> Result<()> {
    let args: Args = argh::from_env();

    // Special switch to just print the version and exit.
    if let Command::Version(_) = args.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;

    observability::init_tracing(&config);
    tracing::debug!(?config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match args.command {
            Command::Stat(StatCommand { path }) => stat::stat(&config, &path).await,
            Command::Version(VersionCommand {}) => unreachable!(),
        }
    })
}
