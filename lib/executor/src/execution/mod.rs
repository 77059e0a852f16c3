//! Runs a planned operation: dispatches its sub-queries, merges what comes back and
//! projects the result onto the client's selection.

pub mod error;
pub mod state;

use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use hive_fusion_composition::ComposedSchema;
use hive_fusion_query_planner::{plan_operation, ClientOperation, OperationPlan, SubQuery};
use indexmap::IndexMap;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::execution::error::ExecutionError;
use crate::execution::state::{RequestLifecycle, RequestState};
use crate::executors::common::SourceSchemaRequest;
use crate::executors::error::ExecutorError;
use crate::executors::map::SourceSchemaExecutorMap;
use crate::projection::response::project_by_operation;
use crate::response::error_normalization::{normalize_source_schema_errors, request_failure_errors};
use crate::response::graphql_error::GraphQLError;
use crate::response::merge::deep_merge_with_keys;
use crate::response::source_response::SourceSchemaResponse;
use crate::response::value::Value;

/// A client request: an operation document, the name of the operation to run and its
/// variables.
#[derive(Debug, Clone, Default)]
pub struct ExecutionRequest {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: IndexMap<String, Value>,
}

impl ExecutionRequest {
    pub fn new(query: impl Into<String>) -> Self {
        ExecutionRequest {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_variable(mut self, name: &str, value: Value) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }

    pub fn with_operation_name(mut self, operation_name: &str) -> Self {
        self.operation_name = Some(operation_name.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResponse {
    /// Absent when the request failed before execution or was cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
    #[serde(skip)]
    pub state: RequestState,
}

impl ExecutionResponse {
    fn request_error(error: ExecutionError, state: RequestState) -> Self {
        ExecutionResponse {
            data: None,
            errors: vec![error.into()],
            state,
        }
    }

    pub fn to_json(&self) -> String {
        sonic_rs::to_string(self).unwrap_or_default()
    }
}

struct ConcurrencyScope<'exec, T> {
    jobs: FuturesUnordered<BoxFuture<'exec, T>>,
}

impl<'exec, T> ConcurrencyScope<'exec, T> {
    fn new() -> Self {
        Self {
            jobs: FuturesUnordered::new(),
        }
    }

    fn spawn(&mut self, future: BoxFuture<'exec, T>) {
        self.jobs.push(future);
    }

    async fn join_all(mut self) -> Vec<T> {
        let mut results = Vec::with_capacity(self.jobs.len());
        while let Some(result) = self.jobs.next().await {
            results.push(result);
        }
        results
    }
}

type DispatchOutcome = Result<SourceSchemaResponse, ExecutorError>;

/// Parses, plans and executes a client request.
///
/// Failing sub-dispatches never fail the whole request: their errors are reported next to
/// the data of the others. Cancelling `cancellation_token` drops every in-flight
/// sub-dispatch and answers with a single error and no data.
#[instrument(level = "trace", skip_all, fields(operation_name = request.operation_name.as_deref()))]
pub async fn execute_operation(
    schema: &ComposedSchema,
    executors: &SourceSchemaExecutorMap,
    request: &ExecutionRequest,
    cancellation_token: &CancellationToken,
) -> ExecutionResponse {
    let mut lifecycle = RequestLifecycle::default();

    let planned = ClientOperation::parse(&request.query, request.operation_name.as_deref())
        .and_then(|operation| {
            let plan = plan_operation(schema, &operation)?;
            Ok((operation, plan))
        });
    let (operation, plan) = match planned {
        Ok(planned) => planned,
        Err(error) => {
            debug!(error = %error, "failed to plan operation");
            lifecycle.advance(RequestState::Failed);
            return ExecutionResponse::request_error(error.into(), lifecycle.state());
        }
    };
    lifecycle.advance(RequestState::Extracted);

    let outcomes = tokio::select! {
        biased;
        _ = cancellation_token.cancelled() => None,
        outcomes = dispatch_plan(executors, &plan, request, &mut lifecycle) => Some(outcomes),
    };
    let Some(outcomes) = outcomes else {
        lifecycle.advance(RequestState::Cancelled);
        return ExecutionResponse::request_error(ExecutionError::Cancelled, lifecycle.state());
    };

    lifecycle.advance(RequestState::Merging);
    let mut merged = Value::Object(Vec::new());
    let mut errors = Vec::new();
    let mut failed = 0;

    for (sub_query, outcome) in plan.sub_queries.iter().zip(outcomes) {
        match outcome {
            Some(Ok(response)) => {
                let source_errors = response.errors.unwrap_or_default();
                if !source_errors.is_empty() {
                    failed += 1;
                }
                deep_merge_with_keys(&mut merged, response.data, &plan.entity_keys);
                errors.extend(normalize_source_schema_errors(
                    source_errors,
                    &sub_query.source_schema,
                    &operation,
                ));
            }
            Some(Err(failure)) => {
                failed += 1;
                errors.extend(request_failure_errors(
                    &failure,
                    &sub_query.source_schema,
                    &sub_query.root_response_keys,
                    &operation,
                ));
            }
            None => {}
        }
    }

    let data = project_by_operation(schema, &operation, &merged, &request.variables, &mut errors);

    lifecycle.advance(match failed {
        0 => RequestState::Completed,
        failed if failed == plan.sub_queries.len() => RequestState::Failed,
        _ => RequestState::PartiallyFailed,
    });

    ExecutionResponse {
        data: Some(data),
        errors,
        state: lifecycle.state(),
    }
}

/// Dispatches the plan group by group and returns the outcome of every sub-query, indexed
/// like `plan.sub_queries`.
async fn dispatch_plan(
    executors: &SourceSchemaExecutorMap,
    plan: &OperationPlan,
    request: &ExecutionRequest,
    lifecycle: &mut RequestLifecycle,
) -> Vec<Option<DispatchOutcome>> {
    let mut outcomes: Vec<Option<DispatchOutcome>> = vec![None; plan.sub_queries.len()];

    for group in plan.groups() {
        lifecycle.advance(RequestState::Dispatching);
        let mut scope = ConcurrencyScope::new();
        for sub_query in plan.sub_queries_in_group(group) {
            scope.spawn(dispatch(executors, plan, sub_query, request).boxed());
        }
        for (id, outcome) in scope.join_all().await {
            if let Some(slot) = outcomes.get_mut(id) {
                *slot = Some(outcome);
            }
        }
    }

    outcomes
}

#[instrument(level = "trace", skip_all, fields(source_schema = %sub_query.source_schema, id = sub_query.id))]
async fn dispatch<'a>(
    executors: &'a SourceSchemaExecutorMap,
    plan: &'a OperationPlan,
    sub_query: &'a SubQuery,
    request: &'a ExecutionRequest,
) -> (usize, DispatchOutcome) {
    let variables = sub_query
        .variables
        .iter()
        .filter_map(|name| {
            request
                .variables
                .get_key_value(name)
                .map(|(name, value)| (name.as_str(), value))
        })
        .collect();
    let source_request = SourceSchemaRequest {
        query: &sub_query.document_str,
        operation_name: plan.operation_name.as_deref(),
        variables,
    };

    let outcome = executors
        .execute(&sub_query.source_schema, source_request)
        .await;
    match &outcome {
        Ok(response) => debug!(errors = response.errors().len(), "sub-dispatch completed"),
        Err(error) => warn!(error = %error, "sub-dispatch failed"),
    }

    (sub_query.id, outcome)
}
