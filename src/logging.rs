//! Tracing setup for the binary.
//!
//! Logs always go to stderr so stdout stays clean for `--json` output.
//! With file logging enabled, a daily-rotated copy is also written under
//! [`crate::paths::logs_dir`].

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Default filter when `RUST_LOG` is unset.
pub fn default_directives(level: &str) -> String {
    format!("vidscout={level},vidscout_search={level}")
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)))
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is on; keep it alive
/// until exit so buffered lines are flushed.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !config.file {
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(stderr_layer)
            .try_init()?;
        return Ok(None);
    }

    let dir = crate::paths::logs_dir();
    std::fs::create_dir_all(&dir)?;
    let appender = tracing_appender::rolling::daily(&dir, "vidscout.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;
    tracing::debug!(dir = %dir.display(), "file logging enabled");
    Ok(Some(guard))
}
