use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

use crate::commands::CommandOutput;
use crate::error::CliError;

pub fn render<T: Serialize>(payload: &T, pretty: bool) -> Result<(), CliError> {
    println!("{}", to_json(payload, pretty)?);
    Ok(())
}

pub fn emit(output: &CommandOutput, pretty: bool) -> Result<(), CliError> {
    println!("{}", format_output(output, pretty)?);
    Ok(())
}

/// Server payloads are printed byte for byte unless `--pretty` asks for
/// reformatting, which only applies when the payload is JSON.
fn format_output(output: &CommandOutput, pretty: bool) -> Result<String, CliError> {
    match output {
        CommandOutput::Json(value) => to_json(value, pretty),
        CommandOutput::Text(payload) if pretty => {
            match serde_json::from_str::<Value>(payload) {
                Ok(value) => to_json(&value, true),
                Err(_) => Ok(payload.clone()),
            }
        }
        CommandOutput::Text(payload) => Ok(payload.clone()),
    }
}

fn to_json<T: Serialize>(payload: &T, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    Ok(payload)
}

/// Saves downloaded bytes and describes what was written.
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<Value, CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(json!({
        "output": path.display().to_string(),
        "bytes": bytes.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = r#"{"status":"UP", "version":"0.0.7","uptime":{"seconds":3600}}"#;

    #[test]
    fn server_payload_is_printed_unmodified() {
        let output = CommandOutput::Text(String::from(STATUS));

        assert_eq!(format_output(&output, false).expect("formatted"), STATUS);
    }

    #[test]
    fn pretty_reformats_json_payloads_only() {
        let pretty = format_output(&CommandOutput::Text(String::from(STATUS)), true)
            .expect("formatted");
        assert!(pretty.contains("\n  \"status\": \"UP\""), "{pretty}");

        let plain = format_output(&CommandOutput::Text(String::from("UP")), true)
            .expect("formatted");
        assert_eq!(plain, "UP");
    }

    #[test]
    fn built_documents_follow_the_pretty_flag() {
        let output = CommandOutput::Json(json!({"outputFileName": "map-77b1.png"}));

        assert_eq!(
            format_output(&output, false).expect("formatted"),
            r#"{"outputFileName":"map-77b1.png"}"#
        );
        assert!(format_output(&output, true)
            .expect("formatted")
            .contains('\n'));
    }

    #[tokio::test]
    async fn written_file_is_described_by_path_and_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("maps").join("pUC19.png");

        let summary = write_bytes(&path, b"\x89PNG").await.expect("writable");

        assert_eq!(summary["bytes"], 4);
        assert_eq!(summary["output"], path.display().to_string());
        assert_eq!(std::fs::read(&path).expect("written"), b"\x89PNG");
    }
}
