use hive_fusion_query_planner::ExtractionError;

use crate::response::error_normalization::ErrorCode;
use crate::response::graphql_error::GraphQLError;

/// Failures that end a request before any data is produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error(transparent)]
    Planning(#[from] ExtractionError),
    #[error("The request was cancelled.")]
    Cancelled,
}

impl ExecutionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExecutionError::Planning(_) => ErrorCode::OperationPlanningFailed,
            ExecutionError::Cancelled => ErrorCode::RequestCancelled,
        }
    }
}

impl From<ExecutionError> for GraphQLError {
    fn from(error: ExecutionError) -> Self {
        let code = error.code();
        GraphQLError::from(error.to_string()).with_code(code.as_ref())
    }
}
