//! Logging configuration
//!
//! Structured logging via `tracing` with an env-driven filter. The core
//! itself only emits events; hosts call [`init_logging`] once at startup.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level when RUST_LOG is unset
    pub level: Level,

    /// Log to stderr instead of stdout
    pub stderr: bool,

    /// Include event targets
    pub targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            stderr: true,
            targets: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            if rust_log.contains("trace") {
                config.level = Level::TRACE;
            } else if rust_log.contains("debug") {
                config.level = Level::DEBUG;
            } else if rust_log.contains("warn") {
                config.level = Level::WARN;
            } else if rust_log.contains("error") {
                config.level = Level::ERROR;
            }
        }

        if let Ok(log_stderr) = std::env::var("CRESTRON_LOG_STDERR") {
            config.stderr = log_stderr.to_lowercase() != "false";
        }

        config
    }
}

/// Initialize logging with the given configuration
pub fn init_logging(
    config: LogConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    let builder = fmt()
        .with_env_filter(env_filter)
        .with_level(true)
        .with_target(config.targets);

    if config.stderr {
        builder.with_writer(std::io::stderr).try_init()?;
    } else {
        builder.try_init()?;
    }

    Ok(())
}
