use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Failed to parse endpoint \"{0}\" as URI: {1}")]
    EndpointParseFailure(String, String),
    #[error("Failed to build request to \"{0}\": {1}")]
    RequestBuildFailure(String, String),
    #[error("Failed to send request to \"{0}\": {1}")]
    RequestFailure(String, String),
    #[error("Failed to serialize variable \"{0}\": {1}")]
    VariablesSerializationFailure(String, String),
    #[error("Failed to deserialize the response: {0}")]
    ResponseDeserializationFailure(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("No executor is registered for source schema \"{0}\"")]
    SourceSchemaNotFound(String),
}
