//! Opt-in log output for applications embedding bedb.
//!
//! The connectors only emit `tracing` events. Installing a subscriber is the
//! application's call; [`init`] does it from environment variables when the
//! `tracing-subscriber` feature is enabled:
//!
//! - `BEDB_DEBUG=true|1|yes` - debug level
//! - `BEDB_LOG_LEVEL=trace|debug|info|warn|error` - explicit level
//! - `BEDB_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! Events never carry passwords; URIs are logged with the password masked.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check whether `BEDB_DEBUG` is set to a truthy value.
pub fn is_debug_enabled() -> bool {
    env::var("BEDB_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Level from `BEDB_LOG_LEVEL`, else `debug` when `BEDB_DEBUG` is set, else `warn`.
pub fn log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("BEDB_LOG_LEVEL") {
        Ok(level) => parse_level(&level).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

/// Format from `BEDB_LOG_FORMAT`, defaulting to `json`.
pub fn log_format() -> &'static str {
    env::var("BEDB_LOG_FORMAT")
        .map(|f| parse_format(&f))
        .unwrap_or("json")
}

fn parse_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn parse_format(format: &str) -> &'static str {
    match format.to_lowercase().as_str() {
        "pretty" => "pretty",
        "compact" => "compact",
        _ => "json",
    }
}

/// Install a global subscriber from the environment. Later calls are no-ops,
/// and nothing is installed unless `BEDB_DEBUG` or `BEDB_LOG_LEVEL` is set.
pub fn init() {
    if !is_debug_enabled() && env::var("BEDB_LOG_LEVEL").is_err() {
        return;
    }
    init_with(log_level(), log_format());
}

/// Install a global subscriber with an explicit level and format.
pub fn init_with(level: &str, format: &str) {
    let level = parse_level(level).unwrap_or("warn");
    let format = parse_format(format);

    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let directives = ["bedb", "bedb_core", "bedb_mongodb", "bedb_postgres", "bedb_mysql"]
                .map(|krate| format!("{krate}={level}"))
                .join(",");
            let filter =
                EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format, "bedb logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = (level, format);
        }
    });
}
