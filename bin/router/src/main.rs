use std::process::ExitCode;

use clap::Parser;
use hive_fusion::{cli::Cli, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(exit_code) => exit_code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
