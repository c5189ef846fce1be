//! Structured logging configuration.
//!
//! Log output goes to stderr so command output on stdout stays parseable.
//! Library records emitted through the `log` facade are captured by the
//! subscriber as well.

use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn,swiss_tournament=info,st_cli=info,sqlx=warn";

/// Commands slower than this are logged at warn level
pub const SLOW_COMMAND: Duration = Duration::from_secs(1);

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use st_cli::logging;
///
/// logging::init();
/// tracing::info!("Connected");
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// Log a finished command with its duration
///
/// # Example
///
/// ```
/// use st_cli::logging::log_command;
/// use std::time::Duration;
///
/// log_command("standings", Duration::from_millis(12), true);
/// ```
pub fn log_command(command: &str, elapsed: Duration, succeeded: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if !succeeded {
        tracing::warn!(command = command, duration_ms = duration_ms, "Command failed");
    } else if elapsed > SLOW_COMMAND {
        tracing::warn!(
            command = command,
            duration_ms = duration_ms,
            "Slow command detected"
        );
    } else {
        tracing::debug!(command = command, duration_ms = duration_ms, "Command completed");
    }
}
