//! Log subscriber setup for step runs.
//!
//! The filter comes from `PROBAR_STEPS_LOG` when set, otherwise from the
//! caller's default directive. Installing twice is a no-op.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PROBAR_STEPS_LOG";

/// Default filter directive
pub const DEFAULT_FILTER: &str = "info";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human readable subscriber.
///
/// Returns `false` when a global subscriber was already set.
pub fn init_logging(default: &str) -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(env_filter(default))
        .try_init()
        .is_ok()
}

/// Install a JSON subscriber for CI logs
pub fn init_json_logging(default: &str) -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(env_filter(default))
        .try_init()
        .is_ok()
}
