//! Logging configuration.
//!
//! Logs go to stderr so report JSON on stdout stays clean. Set
//! `DEBUG_LOGGING=1` to enable debug output for arcstat crates; `RUST_LOG`
//! takes precedence over both defaults when set.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_DIRECTIVE: &str = "warn,arcstat_core=info,arcstat_cli=info";
const DEBUG_DIRECTIVE: &str = "info,arcstat_core=debug,arcstat_cli=debug";

/// Initialize stderr logging. Call once, before any command runs.
pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug_logging {
            DEBUG_DIRECTIVE
        } else {
            DEFAULT_DIRECTIVE
        })
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::debug!(debug_logging, "arcstat logging initialized");
}
