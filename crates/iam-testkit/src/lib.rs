//! IAM Testkit - recording fakes for engine tests
//!
//! - [`FakeResourceUpdater`]: in-memory policy store with call recording,
//!   optional version-token enforcement and injectable failures
//! - [`FakePrincipalService`]: in-memory directory recording every batch
//! - [`init_test_logging`]: idempotent tracing setup for test binaries

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod principals;
mod updater;

pub use principals::FakePrincipalService;
pub use updater::FakeResourceUpdater;

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static LOGGING: Once = Once::new();

/// Install a test-writer subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
