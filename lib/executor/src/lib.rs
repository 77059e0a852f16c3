//! Distributed execution of federated operations.
//!
//! A client request is planned into sub-queries, each sub-query is dispatched to the source
//! schema owning it, and the partial results are merged and projected back onto the
//! client's selection.

pub mod execution;
pub mod executors;
pub mod projection;
pub mod response;

#[cfg(test)]
mod tests;

pub use execution::error::ExecutionError;
pub use execution::state::RequestState;
pub use execution::{execute_operation, ExecutionRequest, ExecutionResponse};
pub use executors::common::{SourceSchemaExecutor, SourceSchemaRequest};
pub use executors::error::ExecutorError;
pub use executors::http::HttpSourceSchemaExecutor;
pub use executors::local::{LocalRequest, LocalSourceSchemaExecutor};
pub use executors::map::SourceSchemaExecutorMap;
pub use executors::timeout::TimeoutExecutor;
pub use response::graphql_error::GraphQLError;
pub use response::source_response::SourceSchemaResponse;
pub use response::value::Value;
