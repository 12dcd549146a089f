//! Log capture for tests.

use tracing_subscriber::EnvFilter;

/// Errors from everything, full verbosity from the blobstore crates.
///
/// Filter targets match by prefix, so `blobstore` covers all `blobstore_*` crates.
const DEFAULT_FILTER: &str = "ERROR,blobstore=TRACE";

/// Installs a logger writing to the output captured by the test harness.
///
/// `RUST_LOG` replaces the default filter when set. Only the first call in a test binary installs
/// the logger, later calls do nothing.
///
/// ```
/// blobstore_test::tracing::init();
/// blobstore_test::tracing::init();
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .without_time()
        .try_init()
        .ok();
}
