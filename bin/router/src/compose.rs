use std::path::Path;
use std::process::ExitCode;

use hive_fusion_composition::{compose, CompositionResult, SourceSchema};
use hive_fusion_config::FusionConfig;
use tracing::{info, instrument};

use crate::cli::{ComposeCommand, SourceArg};
use crate::error::CliError;

fn read_source_schema(name: &str, path: &Path) -> Result<SourceSchema, CliError> {
    let sdl = std::fs::read_to_string(path)
        .map_err(|err| CliError::ReadFileError(path.display().to_string(), err))?;
    Ok(SourceSchema::parse(name, &sdl)?)
}

/// The configured source schemas in configuration order, followed by `extra`.
pub fn load_source_schemas(
    config: &FusionConfig,
    extra: &[SourceArg],
) -> Result<Vec<SourceSchema>, CliError> {
    let mut sources = Vec::with_capacity(config.source_schemas.len() + extra.len());
    for (name, source) in &config.source_schemas {
        sources.push(read_source_schema(name, &source.schema_path.absolute)?);
    }
    for source in extra {
        sources.push(read_source_schema(&source.name, &source.path)?);
    }

    if sources.is_empty() {
        return Err(CliError::NoSourceSchemas);
    }
    Ok(sources)
}

/// One line per diagnostic, in the order composition raised them.
pub fn render_diagnostics(result: &CompositionResult) -> String {
    result
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[instrument(level = "trace", skip_all)]
pub fn compose_sources(
    config: &FusionConfig,
    extra: &[SourceArg],
) -> Result<CompositionResult, CliError> {
    let sources = load_source_schemas(config, extra)?;
    let result = compose(&sources);
    info!(
        source_schemas = sources.len(),
        errors = result.diagnostics().iter_errors().count(),
        warnings = result.diagnostics().iter_warnings().count(),
        "composed source schemas"
    );
    Ok(result)
}

pub fn run(config: &FusionConfig, command: &ComposeCommand) -> Result<ExitCode, CliError> {
    let result = compose_sources(config, &command.sources)?;

    if !result.diagnostics().is_empty() {
        eprintln!("{}", render_diagnostics(&result));
    }
    if !result.is_success() {
        return Err(CliError::CompositionFailed(
            result.diagnostics().iter_errors().count(),
        ));
    }

    let schema = result.schema();
    let sdl = match command.client {
        true => schema.to_client_sdl(),
        false => schema.to_sdl(),
    };
    println!("{}", sdl);

    Ok(ExitCode::SUCCESS)
}
