//! Configuration for the blobstore command line tool.
//!
//! Configuration can be loaded from multiple sources with the following precedence (highest to
//! lowest):
//!
//! 1. Environment variables (prefixed with `BS__`)
//! 2. YAML configuration file (specified via `-c` or `--config` flag)
//! 3. Defaults
//!
//! See [`Config`] for a description of all configuration fields and their defaults.
//!
//! # Environment Variables
//!
//! Environment variables use `BS__` as a prefix and double underscores (`__`) to denote nested
//! configuration structures. For example:
//!
//! - `BS__SERVICE_URL=https://storage.example.com/` sets the service URL
//! - `BS__LOGGING__LEVEL=debug` sets the log level
//! - `BS__HEADERS__AUTHORIZATION=...` adds an `authorization` request header
//!
//! # YAML Configuration File
//!
//! The above configuration in YAML format would look like this:
//!
//! ```yaml
//! service_url: https://storage.example.com/
//! logging:
//!   level: debug
//! headers:
//!   authorization: ...
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use blobstore_types::DEFAULT_USER_METADATA_PREFIX;
use figment::providers::{Env, Format, Serialized, Yaml};
use secrecy::{CloneableSecret, SecretBox, SerializableSecret, zeroize::Zeroize};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Environment variable prefix for all configuration options.
const ENV_PREFIX: &str = "BS__";

/// A configured string that is redacted from `Debug` output, such as a credential header.
///
/// Use with [`secrecy::SecretBox`].
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigSecret(String);

impl ConfigSecret {
    /// Returns the secret value.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ConfigSecret {
    fn from(value: &str) -> Self {
        ConfigSecret(value.to_owned())
    }
}

impl fmt::Debug for ConfigSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[redacted]")
    }
}

impl CloneableSecret for ConfigSecret {}
impl SerializableSecret for ConfigSecret {}
impl Zeroize for ConfigSecret {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Log output format.
///
/// Controls how log messages are formatted. The format can be explicitly specified or
/// auto-detected based on whether stderr, where logs are written, is a TTY.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] if stderr is a TTY, otherwise [`LogFormat::Simplified`].
    Auto,

    /// Pretty printing with colors.
    Pretty,

    /// Simplified plain text output.
    Simplified,

    /// Dump out JSON lines.
    Json,
}

/// The logging format parse error.
#[derive(Clone, Debug)]
pub struct FormatParseError(String);

impl fmt::Display for FormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"error parsing "{}" as format: expected one of "auto", "pretty", "simplified", "json""#,
            self.0
        )
    }
}

impl std::str::FromStr for LogFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let result = match s {
            "" => LogFormat::Auto,
            s if s.eq_ignore_ascii_case("auto") => LogFormat::Auto,
            s if s.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            s if s.eq_ignore_ascii_case("simplified") => LogFormat::Simplified,
            s if s.eq_ignore_ascii_case("json") => LogFormat::Json,
            s => return Err(FormatParseError(s.into())),
        };

        Ok(result)
    }
}

impl std::error::Error for FormatParseError {}

mod display_fromstr {
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: std::fmt::Display,
    {
        serializer.collect_str(&value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Display,
    {
        use serde::Deserialize;
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Logging configuration.
///
/// Logs are always written to stderr, so they never mix with command output.
#[derive(Debug, Deserialize, Serialize)]
pub struct Logging {
    /// Minimum log level to output.
    ///
    /// The `RUST_LOG` environment variable overrides this and provides more granular control per
    /// module if needed.
    ///
    /// # Default
    ///
    /// `INFO`
    ///
    /// # Environment Variable
    ///
    /// `BS__LOGGING__LEVEL`
    #[serde(with = "display_fromstr")]
    pub level: LevelFilter,

    /// Log output format.
    ///
    /// # Default
    ///
    /// `Auto` (pretty if stderr is a TTY, simplified otherwise)
    ///
    /// # Environment Variable
    ///
    /// `BS__LOGGING__FORMAT`
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Auto,
        }
    }
}

/// Main configuration struct for the blobstore command line tool.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the object storage service.
    ///
    /// Object paths given on the command line are resolved relative to this URL, and the derived
    /// object key includes any path prefix of it.
    ///
    /// # Default
    ///
    /// `http://localhost:8888/`
    ///
    /// # Environment Variable
    ///
    /// `BS__SERVICE_URL`
    pub service_url: String,

    /// Connect and read timeout for requests, in humantime format (e.g. `500ms`, `5s`).
    ///
    /// # Default
    ///
    /// `5s`
    ///
    /// # Environment Variable
    ///
    /// `BS__TIMEOUT`
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Additional headers sent with every request.
    ///
    /// Values are redacted from debug output, since they commonly carry credentials.
    ///
    /// # Default
    ///
    /// Empty
    ///
    /// # Environment Variables
    ///
    /// Each header is set individually:
    /// - `BS__HEADERS__AUTHORIZATION=...`
    pub headers: BTreeMap<String, SecretBox<ConfigSecret>>,

    /// Header prefix of user-defined metadata, reported separately in the output.
    ///
    /// # Default
    ///
    /// `x-amz-meta-`
    ///
    /// # Environment Variable
    ///
    /// `BS__USER_METADATA_PREFIX`
    pub user_metadata_prefix: String,

    /// Logging configuration.
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8888/".into(),
            timeout: Duration::from_secs(5),
            headers: BTreeMap::new(),
            user_metadata_prefix: DEFAULT_USER_METADATA_PREFIX.into(),
            logging: Logging::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the provided arguments.
    ///
    /// Configuration is merged in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. YAML configuration file (if provided in `path`)
    /// 3. Environment variables (prefixed with `BS__`)
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML file cannot be read or parsed, or if any environment variables
    /// contain invalid values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = figment::Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}
