//! File-backed tracing setup.
//!
//! The TUI owns the terminal, so all diagnostics go to
//! `${IDCHAT_HOME}/logs/idchat.log` (rotated daily).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, paths};

/// Env var that takes precedence over `[log] level`.
pub const LOG_ENV: &str = "IDCHAT_LOG";

const LOG_FILE_PREFIX: &str = "idchat.log";

/// Installs the global subscriber writing to the default logs dir.
///
/// The returned guard flushes pending records on drop and must be held for
/// the life of the process.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
    init_in(&paths::logs_dir(), config)
}

/// Installs the global subscriber writing into `dir`.
pub fn init_in(dir: &Path, config: &LogConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        let config = LogConfig {
            level: "not a [valid filter".to_string(),
        };
        // Must not panic; the exact directive string is an implementation detail.
        let filter = build_filter(&config);
        assert!(!filter.to_string().is_empty());
    }
}
