use hive_fusion_composition::SourceSchemaError;
use hive_fusion_config::RouterConfigError;
use hive_fusion_executor::ExecutorError;
use hive_fusion_internal::logging::LoggingError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    RouterConfigError(#[from] RouterConfigError),
    #[error(transparent)]
    LoggingError(#[from] LoggingError),
    #[error("Failed to read \"{0}\": {1}")]
    ReadFileError(String, std::io::Error),
    #[error(transparent)]
    SourceSchemaError(#[from] SourceSchemaError),
    #[error("No source schemas to compose, configure `source_schemas` or pass `name=path` arguments")]
    NoSourceSchemas,
    #[error("Composition failed with {0} error(s)")]
    CompositionFailed(usize),
    #[error("Invalid variables: {0}")]
    InvalidVariables(String),
    #[error(transparent)]
    ExecutorError(#[from] ExecutorError),
    #[error("Failed to write the response: {0}")]
    OutputError(String),
}
