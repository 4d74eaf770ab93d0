//! Shared logging utilities for consistent tracing output

use tracing::{error, info};

/// Initialize the tracing subscriber with an optional base log level.
///
/// `RUST_LOG` takes precedence when set; otherwise the level applies to the
/// deployer and shared crates while leaving dependencies quiet.
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let base_level = log_level.unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deployer={base_level},shared={base_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Initialize tracing with default settings.
pub fn init_tracing() {
    init_tracing_with_level(None);
}

/// Contextual logging helper for startup messages
pub fn log_startup(details: &str) {
    info!("🚀 Starting {}", details);
}

/// Contextual logging helper for error conditions
pub fn log_error(context: &str, error: &dyn std::fmt::Display) {
    error!(error = %error, "❌ {} failed: {}", context, error);
}

/// Contextual logging helper for success conditions
pub fn log_success(message: &str) {
    info!("✅ {}", message);
}
