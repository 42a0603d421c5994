use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default directives for the operator CLI. Override via `RUST_LOG`.
pub const CLI_LOG_DEFAULT: &str = "warn,vinscan=info,vinscan_core=info";

/// Default directives for the API server. Override via `RUST_LOG`.
pub const SERVER_LOG_DEFAULT: &str =
    "info,vinscan_server=info,vinscan_core=info,tower_http=warn";

/// Install the global subscriber. Logs go to stderr so they never interleave
/// with status lines on stdout.
pub fn init_logging(default_directives: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
