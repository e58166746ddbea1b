//! Debug logging
//!
//! Off unless SHELF_LOG is set. Output goes to a file so it never mixes
//! with command output.

use std::fs::OpenOptions;

use shelf_core::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log level (e.g. `debug`)
const LOG_ENV: &str = "SHELF_LOG";

/// Initialize file-based logging
///
/// Logs to `config.log_file` or `{data_dir}/debug.log`.
pub fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(filter_directive(&log_level));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

/// Filter enabling `level` for this workspace's crates only
fn filter_directive(level: &str) -> String {
    format!("shelf_core={},shelf={}", level, level)
}
