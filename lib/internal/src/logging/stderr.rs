use std::io::IsTerminal;

use hive_fusion_config::log::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::time::UtcTime, Layer};

use crate::logging::utils::{create_env_filter, DynLayer};
use crate::logging::LoggingError;

/// Logs go to stderr, stdout is reserved for command output.
pub fn build_stderr_layer<S>(config: &LoggingConfig) -> Result<(DynLayer<S>, WorkerGuard), LoggingError>
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
{
    let stderr_stream = std::io::stderr();
    let is_terminal = stderr_stream.is_terminal();
    let filter = create_env_filter(config)?;
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(stderr_stream);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(stderr_writer);
    let timer = UtcTime::rfc_3339();

    let layer = match config.format {
        LogFormat::Json => stderr_layer
            .json()
            .with_timer(timer)
            .with_thread_ids(false)
            .with_target(false)
            .with_ansi(false)
            .flatten_event(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => stderr_layer
            .compact()
            .with_thread_ids(false)
            .with_timer(timer)
            .with_target(false)
            .with_ansi(is_terminal)
            .with_filter(filter)
            .boxed(),
    };

    Ok((layer, stderr_guard))
}
