pub mod stderr;
pub mod utils;

use hive_fusion_config::log::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::logging::stderr::build_stderr_layer;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter \"{0}\": {1}")]
    InvalidFilter(String, String),
    #[error("failed to install the global logger: {0}")]
    AlreadyInitialized(String),
}

/// Installs the global subscriber described by `config`. Logs are written by a background
/// worker that flushes on drop of the returned guard, so keep it alive until exit.
pub fn configure_logging(config: &LoggingConfig) -> Result<WorkerGuard, LoggingError> {
    let (layer, guard) = build_stderr_layer(config)?;

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|err| LoggingError::AlreadyInitialized(err.to_string()))?;

    Ok(guard)
}
