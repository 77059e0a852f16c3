pub mod cli;
pub mod compose;
pub mod error;
pub mod execute;

#[cfg(test)]
mod tests;

use std::process::ExitCode;

use hive_fusion_config::load_config;
use hive_fusion_internal::logging::configure_logging;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = load_config(cli.command.config_path())?;
    let _logging_guard = configure_logging(&config.log)?;

    match cli.command {
        Command::Compose(command) => compose::run(&config, &command),
        Command::Execute(command) => execute::run(&config, &command).await,
    }
}
