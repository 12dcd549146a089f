//! Logging setup for the command line tool.

use std::env;
use std::io::IsTerminal;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, prelude::*};

use crate::config::{Config, LogFormat};

/// Installs the global tracing subscriber, writing to stderr.
pub fn init_tracing(config: &Config) {
    let (level, env_filter) = parse_rust_log(config.logging.level);

    let format = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let format = match config.logging.format {
        LogFormat::Auto if std::io::stderr().is_terminal() => format.pretty().boxed(),
        LogFormat::Auto | LogFormat::Simplified => format.compact().with_ansi(false).boxed(),
        LogFormat::Pretty => format.pretty().boxed(),
        LogFormat::Json => format.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(format.with_filter(level))
        .with(env_filter)
        .init();
}

/// Resolves the effective level and filter from `RUST_LOG`, falling back to `default_level`.
///
/// A plain level in `RUST_LOG` applies to the internal filter below. Anything else is used
/// literally, for users who know which overrides they want.
pub fn parse_rust_log(default_level: LevelFilter) -> (LevelFilter, EnvFilter) {
    let level = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) => match value.parse::<Level>() {
            Ok(level) => LevelFilter::from(level),
            Err(_) => return (LevelFilter::TRACE, EnvFilter::new(value)),
        },
        Err(_) => default_level,
    };

    // This is the maximum verbosity that will be logged, we filter this down to `level`.
    // Targets match by prefix, so `blobstore` covers all `blobstore_*` crates.
    let env_filter = EnvFilter::new("INFO,blobstore=TRACE");

    (level, env_filter)
}
