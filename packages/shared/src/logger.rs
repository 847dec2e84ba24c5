//! Logging setup for the livepoll binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// The server library, this crate, the binary itself and `tower_http`
/// (request tracing) all log at `default_log_level`.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    [
        "livepoll_server",
        env!("CARGO_PKG_NAME"),
        binary_name,
        "tower_http",
    ]
    .iter()
    .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
    .collect::<Vec<_>>()
    .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level can be overridden using the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use livepoll_shared::logger::setup_logger;
///
/// setup_logger("livepoll-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
