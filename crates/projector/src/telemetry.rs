//! Structured logging initialisation, shared across every binary in this
//! workspace. Reads `RUST_LOG` for the filter and `LOG_FORMAT` to choose
//! the output format; both are optional.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber. Call once at the very start
/// of `main`, before any other code runs.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var("LOG_FORMAT").unwrap_or_default().to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        _ => tracing_subscriber::registry().with(filter).with(fmt::layer()).init(),
    }
}
