use seqconv_core::{ConversionClient, ReportEnzymesConfig, ReportOrfsConfig};

use crate::cli::{EnzymesArgs, OrfsArgs};
use crate::error::CliError;

pub async fn status(client: &ConversionClient) -> Result<String, CliError> {
    Ok(client.status().await?)
}

pub async fn enzymes(client: &ConversionClient, args: &EnzymesArgs) -> Result<String, CliError> {
    let config = ReportEnzymesConfig::new(args.enzyme_set.into());
    Ok(client.enzymes(&args.file, &config).await?)
}

pub async fn orfs(client: &ConversionClient, args: &OrfsArgs) -> Result<String, CliError> {
    let config = ReportOrfsConfig::new(args.frame.into());
    Ok(client.orfs(&args.file, &config).await?)
}
