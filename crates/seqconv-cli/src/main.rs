mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            match &error {
                CliError::Upstream(failure) => {
                    if let Err(render_error) = output::render(failure, cli.pretty) {
                        eprintln!("error: {render_error}");
                    }
                }
                _ => eprintln!("error: {error}"),
            }
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let produced = commands::run(cli).await?;
    output::emit(&produced, cli.pretty)?;
    Ok(ExitCode::SUCCESS)
}
