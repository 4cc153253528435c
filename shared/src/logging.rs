//! Shared logging utilities for consistent tracing across the supervisor

use crate::errors::{SharedError, SharedResult};
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Crates whose events pass the filter at the configured level
const LOG_TARGETS: [&str; 3] = ["supervisor", "preloader", "shared"];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Build the env-filter directive for the given base level
pub fn filter_directive(log_level: Option<&str>) -> SharedResult<String> {
    let base_level = log_level.unwrap_or("info").to_lowercase();
    if !LOG_LEVELS.contains(&base_level.as_str()) {
        return Err(SharedError::InvalidLogLevel { level: base_level });
    }

    Ok(LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={base_level}"))
        .collect::<Vec<_>>()
        .join(","))
}

/// Initialize the stdout tracing subscriber with an optional log level
pub fn init_tracing_with_level(log_level: Option<&str>) -> SharedResult<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let directive = filter_directive(log_level)?;

    // A subscriber may already be installed (tests, embedding hosts)
    let _ = fmt()
        .with_env_filter(EnvFilter::new(&directive))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    Ok(())
}

/// Initialize tracing at the default level
pub fn init_tracing() -> SharedResult<()> {
    init_tracing_with_level(None)
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for framework-aware info logging
#[macro_export]
macro_rules! framework_info {
    ($framework:expr, $($arg:tt)*) => {
        tracing::info!(
            framework = %$framework,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for framework-aware warning logging
#[macro_export]
macro_rules! framework_warn {
    ($framework:expr, $($arg:tt)*) => {
        tracing::warn!(
            framework = %$framework,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for framework-aware debug logging
#[macro_export]
macro_rules! framework_debug {
    ($framework:expr, $($arg:tt)*) => {
        tracing::debug!(
            framework = %$framework,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(component: &str, details: &str) {
    info!(
        component = component,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(component: &str, reason: &str) {
    info!(
        component = component,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(component: &str, context: &str, error: &dyn std::fmt::Display) {
    error!(
        component = component,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(component: &str, message: &str) {
    info!(
        component = component,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
