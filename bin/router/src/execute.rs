use std::process::ExitCode;

use hive_fusion_config::FusionConfig;
use hive_fusion_executor::{
    execute_operation, ExecutionRequest, RequestState, SourceSchemaExecutorMap, Value,
};
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::ExecuteCommand;
use crate::compose::{compose_sources, render_diagnostics};
use crate::error::CliError;

/// Parses the `--variables` argument, which must be a JSON object.
pub fn parse_variables(raw: Option<&str>) -> Result<IndexMap<String, Value>, CliError> {
    let Some(raw) = raw else {
        return Ok(IndexMap::new());
    };
    let value = Value::from_slice(raw.as_bytes())
        .map_err(|err| CliError::InvalidVariables(err.to_string()))?;

    match value {
        Value::Object(entries) => Ok(entries.into_iter().collect()),
        Value::Null => Ok(IndexMap::new()),
        other => Err(CliError::InvalidVariables(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

pub fn build_request(command: &ExecuteCommand) -> Result<ExecutionRequest, CliError> {
    let query = std::fs::read_to_string(&command.query)
        .map_err(|err| CliError::ReadFileError(command.query.display().to_string(), err))?;

    Ok(ExecutionRequest {
        query,
        operation_name: command.operation_name.clone(),
        variables: parse_variables(command.variables.as_deref())?,
    })
}

pub async fn run(config: &FusionConfig, command: &ExecuteCommand) -> Result<ExitCode, CliError> {
    let request = build_request(command)?;

    let result = compose_sources(config, &[])?;
    if !result.is_success() {
        eprintln!("{}", render_diagnostics(&result));
        return Err(CliError::CompositionFailed(
            result.diagnostics().iter_errors().count(),
        ));
    }
    let schema = result.schema();
    let executors = SourceSchemaExecutorMap::from_config(config)?;

    let cancellation_token = CancellationToken::new();
    let ctrl_c_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling the request");
            ctrl_c_token.cancel();
        }
    });

    let response = execute_operation(schema, &executors, &request, &cancellation_token).await;
    debug!(state = %response.state, errors = response.errors.len(), "operation executed");

    let output = sonic_rs::to_string_pretty(&response)
        .map_err(|err| CliError::OutputError(err.to_string()))?;
    println!("{}", output);

    Ok(match response.state {
        RequestState::Failed | RequestState::Cancelled => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
