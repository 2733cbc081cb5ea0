//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Honour RUST_LOG over the configured level
//!
//! # Design Decisions
//! - Output goes to stderr; Juju copies hook stderr into the unit log
//! - No ANSI colours by default, the unit log is plain text

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Install the global subscriber. Safe to call more than once.
pub fn init(config: &LoggingConfig) {
    let default_filter = format!("heat_charm={},heat_action={}", config.level, config.level);

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi)
                .with_target(false),
        )
        .try_init();
}
