mod files;
mod maps;
mod reports;

use serde_json::Value;
use tracing::debug;

use seqconv_core::{ClientConfig, ConversionClient};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Document built by the CLI.
    Json(Value),
    /// Payload passed through from the server as received.
    Text(String),
}

/// Runs the selected command and returns what to print.
pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let client = build_client(cli)?;

    match &cli.command {
        Command::Status => reports::status(&client).await.map(CommandOutput::Text),
        Command::Enzymes(args) => reports::enzymes(&client, args)
            .await
            .map(CommandOutput::Text),
        Command::Orfs(args) => reports::orfs(&client, args).await.map(CommandOutput::Text),
        Command::Svg(args) => maps::svg(&client, args).await.map(CommandOutput::Json),
        Command::Png(args) => maps::png(&client, args).await.map(CommandOutput::Json),
        Command::PngDownload(args) => maps::png_download(&client, args)
            .await
            .map(CommandOutput::Json),
        Command::Import(args) => files::import(&client, args).await.map(CommandOutput::Json),
        Command::Export(args) => files::export(&client, args).await.map(CommandOutput::Json),
        Command::Download(args) => files::download(&client, args)
            .await
            .map(CommandOutput::Json),
    }
}

/// Environment first, then command-line overrides.
fn build_client(cli: &Cli) -> Result<ConversionClient, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.server_url {
        config = config.with_base_url(url)?;
    }
    if let Some(customer_id) = &cli.customer_id {
        config = config.with_customer_id(customer_id.as_str())?;
    }

    let server_url = config.base_url.to_string();
    let work_dir = config.work_dir.display().to_string();
    let client = ConversionClient::new(config);
    debug!(
        %server_url,
        customer_id = %client.customer_id(),
        %work_dir,
        "client configured"
    );
    Ok(client)
}
