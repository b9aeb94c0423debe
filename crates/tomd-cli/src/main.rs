use std::process::ExitCode;

mod cli;
mod progress;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() -> ExitCode {
    // Logging is initialized per command: `convert` logs into the target directory.
    match CliCommand::run_from_args().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("tomd error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
