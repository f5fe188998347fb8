//! Logging setup for the provider binary.
//!
//! Logs go to **stderr**: stdout carries the handshake line the host reads
//! to find the gRPC address.
//!
//! `RUST_LOG` controls filtering, e.g. `RUST_LOG=openhab_provider=debug`
//! shows request level detail from the openHAB client.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter(default_level)).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Install the global subscriber, defaulting to `info` when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LEVEL);
}

/// Like [`init_logging`] with a custom fallback level.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Install the global subscriber unless one is already set.
///
/// Returns `false` when another subscriber got there first.
pub fn try_init_logging() -> bool {
    subscriber(DEFAULT_LEVEL).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new(DEFAULT_LEVEL).is_ok());
        assert!(EnvFilter::try_new("openhab_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,openhab_provider::client=trace").is_ok());
    }

    #[test]
    fn test_try_init_twice() {
        // the first call may lose against another test's subscriber
        let _ = try_init_logging();
        assert!(!try_init_logging());
    }
}
