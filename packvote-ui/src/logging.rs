//! Tracing subscriber setup.

/// Default filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str =
    "error,packvote_ui=info,packvote_components=info,packvote_demo=info";

/// Installs a global `tracing` subscriber.
///
/// Reads `RUST_LOG` and falls back to [`DEFAULT_FILTER`]. Calling it more than
/// once is harmless: later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
