use serde_json::Value;

use seqconv_core::{ConversionClient, ExportDnaFileConfig};

use crate::cli::{DownloadArgs, ExportArgs, FileArgs};
use crate::error::CliError;
use crate::output;

pub async fn import(client: &ConversionClient, args: &FileArgs) -> Result<Value, CliError> {
    let response = client.import_dna_file(&args.file).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn export(client: &ConversionClient, args: &ExportArgs) -> Result<Value, CliError> {
    let config = ExportDnaFileConfig::new(args.filter.into());
    let response = client.export_dna_file(&args.file, &config).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn download(client: &ConversionClient, args: &DownloadArgs) -> Result<Value, CliError> {
    if args.file_name.trim().is_empty() {
        return Err(CliError::Command(String::from("file name must not be empty")));
    }
    let bytes = client.download_file(&args.file_name).await?;
    output::write_bytes(&args.output, &bytes).await
}
