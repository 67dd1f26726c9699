use serde_json::Value;

use seqconv_core::ConversionClient;

use crate::cli::{MapArgs, PngDownloadArgs};
use crate::error::CliError;
use crate::output;

pub async fn svg(client: &ConversionClient, args: &MapArgs) -> Result<Value, CliError> {
    let response = client
        .convert_to_svg_file(&args.file, &args.map_config())
        .await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn png(client: &ConversionClient, args: &MapArgs) -> Result<Value, CliError> {
    let response = client
        .convert_to_png_file(&args.file, &args.map_config())
        .await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn png_download(
    client: &ConversionClient,
    args: &PngDownloadArgs,
) -> Result<Value, CliError> {
    let bytes = client
        .upload_and_download_png(&args.map.file, &args.map.map_config())
        .await?;
    output::write_bytes(&args.output, &bytes).await
}
