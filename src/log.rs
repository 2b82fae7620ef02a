use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::env::ENV_CONFIG;

/// Diagnostics go to stderr; stdout carries command output only. `RUST_LOG` overrides the level.
pub fn init_tracing_subscriber(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if ENV_CONFIG.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}
