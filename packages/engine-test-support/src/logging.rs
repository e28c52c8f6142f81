//! One-shot tracing subscriber for test binaries.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Filter used when neither `TEST_LOG` nor `RUST_LOG` is set.
const QUIET: &str = "warn";

/// Install the fmt subscriber for the current test binary.
///
/// Safe to call from every test and from `ctor` hooks: only the first call
/// does anything, and an already-installed global subscriber is tolerated.
///
/// Filter precedence is `TEST_LOG`, then `RUST_LOG`, then `warn`, so
/// `TEST_LOG=session_engine=debug cargo test` shows per-action engine logs.
pub fn init() {
    INSTALLED.get_or_init(|| {
        fmt()
            .with_env_filter(filter_from_env())
            .with_test_writer()
            .without_time()
            .with_target(true)
            .try_init()
            .ok();
    });
}

fn filter_from_env() -> EnvFilter {
    ["TEST_LOG", "RUST_LOG"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(QUIET))
}
