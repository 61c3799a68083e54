//! Logging configuration using tracing

use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, ResultExt};

/// Environment variable holding the log filter directives
pub const LOG_ENV_VAR: &str = "MARQUEE_LOG";

const LOG_FILE_PREFIX: &str = "marquee.log";

const DEFAULT_FILTER: &str =
    "matrix_marquee=info,marquee_app=info,marquee_daemon=info,marquee_http=info,warn";

/// Initialize the logging subsystem
///
/// Logs go to a daily rolling file in `log_dir` (or the default directory
/// under `~/.local/share/matrix-marquee/logs/`) and to stderr, so a service
/// manager also captures them. The level is controlled by `MARQUEE_LOG`.
///
/// # Examples
/// ```bash
/// MARQUEE_LOG=debug marquee
/// MARQUEE_LOG=marquee_app=trace marquee --config ./config.toml
/// ```
pub fn init(log_dir: Option<&Path>) -> Result<()> {
    let log_dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_log_directory(),
    };
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .with(
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("matrix-marquee starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the default log directory path
pub fn get_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("matrix-marquee").join("logs")
}
