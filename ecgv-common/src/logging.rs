//! Tracing subscriber setup shared by ECGView binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the log filter
///
/// `RUST_LOG` wins when set; otherwise `level` applies to the ECGView
/// crates and `tower_http` request tracing.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ecgv_sr={level},ecgv_common={level},tower_http={level}"
        ))
    })
}

/// Initialize the global tracing subscriber
///
/// Call once, before anything logs.
pub fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
