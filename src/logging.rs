use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MISH_LOG";

/// Builds the filter from `$MISH_LOG`, falling back to `default_level` and
/// then to `warn` if that does not parse either.
pub fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Diagnostics go to stderr so they never mix with command output.
/// Calling this more than once is harmless.
pub fn init(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
