use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "hive-fusion", version, about = "Compose GraphQL source schemas and execute operations across them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compose the source schemas and print the composed schema.
    Compose(ComposeCommand),
    /// Execute an operation against the configured source schemas.
    Execute(ExecuteCommand),
}

impl Command {
    pub fn config_path(&self) -> Option<String> {
        match self {
            Command::Compose(command) => command.config_path.clone(),
            Command::Execute(command) => command.config_path.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ComposeCommand {
    /// The path of the configuration file
    #[arg(short('c'), long("config"))]
    pub config_path: Option<String>,
    /// Additional source schemas, as `name=path/to/schema.graphql`, composed after the
    /// configured ones
    pub sources: Vec<SourceArg>,
    /// Print the client-facing schema instead of the composed schema
    #[arg(long)]
    pub client: bool,
}

#[derive(Debug, Args)]
pub struct ExecuteCommand {
    /// The path of the configuration file
    #[arg(short('c'), long("config"))]
    pub config_path: Option<String>,
    /// The file holding the operation document
    #[arg(short('q'), long("query"))]
    pub query: PathBuf,
    /// The variables of the operation, as a JSON object
    #[arg(long)]
    pub variables: Option<String>,
    /// The operation to execute when the document defines more than one
    #[arg(long)]
    pub operation_name: Option<String>,
}

/// A source schema given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArg {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for SourceArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
                Ok(SourceArg {
                    name: name.trim().to_string(),
                    path: PathBuf::from(path.trim()),
                })
            }
            _ => Err(format!("expected `name=path`, got \"{}\"", s)),
        }
    }
}
