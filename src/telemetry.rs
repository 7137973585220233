use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn filter(level: &str) -> EnvFilter {
    // RUST_LOG wins over the configured level.
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Installs a JSON subscriber writing to stdout. Calling it twice is harmless.
pub fn init_tracing(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

/// Same as [`init_tracing`] but writes to stderr, for interactive tools whose
/// stdout is the user interface.
pub fn init_tracing_stderr(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
