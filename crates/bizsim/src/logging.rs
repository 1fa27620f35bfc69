use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set
fn default_filter(level: &str) -> String {
    format!("bizsim={level},bizsim_core={level}")
}

/// Initialize logging to stderr so reports on stdout stay clean.
///
/// The log level can be controlled via the `level` parameter or the `RUST_LOG`
/// environment variable.
pub fn init_logging(level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    tracing::debug!(level, "Logging initialized");
}
