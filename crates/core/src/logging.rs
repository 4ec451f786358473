//! Structured logging for mission scoring.
//!
//! The library only emits `tracing` events; binaries pick a subscriber here.
//! Log level comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize human-readable logging on stderr.
///
/// # Example
/// ```no_run
/// use missionscore_core::logging;
///
/// logging::init();
/// tracing::info!("Scoring started");
/// ```
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}

/// Initialize JSON logging on stderr, for log aggregation.
///
/// # Example
/// ```no_run
/// use missionscore_core::logging;
///
/// logging::init_json();
/// tracing::info!(command = "propagate", "Scoring started");
/// ```
pub fn init_json() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
