//! Error handling tests: malformed upstream payloads, hostile output names and
//! local file system failures.

mod support;

use seqconv_core::error::NATIVE_CONVERSION_DETAIL;
use seqconv_core::{
    ApiError, ExportDnaFileConfig, ExportFilter, FailureKind, HttpError, HttpResponse,
};
use tempfile::tempdir;

use support::{
    client, client_with, download_body, fast_policy, output_file, write_input, FakeServer,
    DOWNLOAD, EXPORT, IMPORT, STATUS,
};

const GENBANK: &str = "LOCUS       pUC19    2686 bp    DNA     circular\n//\n";

// =============================================================================
// Upstream payloads
// =============================================================================

#[tokio::test]
async fn unstructured_gateway_error_is_retried_and_synthesized() {
    // Given: A proxy answering 502 with an HTML page
    let dir = tempdir().expect("tempdir");
    let page = "<html><body><h1>502 Bad Gateway</h1></body></html>";
    let server = FakeServer::failing(STATUS, Ok(HttpResponse::new(502, page)));
    let client = client(server.clone(), dir.path());

    // When: Status is requested
    let error = client.status().await.expect_err("gateway error");

    // Then: It counted as a transport failure and was retried
    assert_eq!(server.calls_to(STATUS), 3);
    assert_eq!(error.kind(), FailureKind::Transport);
    assert_eq!(error.http_code(), 502);
    assert!(error.detail().contains("502 Bad Gateway"));
}

#[tokio::test]
async fn unstructured_client_error_is_not_retried() {
    // Given: A server answering 404 with no body
    let dir = tempdir().expect("tempdir");
    let server = FakeServer::failing(STATUS, Ok(HttpResponse::new(404, Vec::new())));
    let client = client(server.clone(), dir.path());

    // When: Status is requested
    let error = client.status().await.expect_err("not found");

    // Then: A single attempt, reported as a client failure
    assert_eq!(server.calls_to(STATUS), 1);
    assert_eq!(error.kind(), FailureKind::Client);
    assert_eq!(error.http_code(), 404);
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_failure() {
    // Given: An import that answers 200 with something that is not JSON
    let dir = tempdir().expect("tempdir");
    let input = write_input(dir.path(), "pUC19.gb", GENBANK);
    let server = FakeServer::failing(IMPORT, Ok(HttpResponse::ok("OK")));
    let client = client(server.clone(), dir.path());

    // When: The file is imported
    let error = client.import_dna_file(&input).await.expect_err("bad body");

    // Then: One call, reported as undecodable
    assert_eq!(server.calls_to(IMPORT), 1);
    assert_eq!(error.kind(), FailureKind::Decode);
    assert_eq!(error.http_code(), 502);
    assert!(!error.retryable());
}

#[tokio::test]
async fn validation_errors_list_is_used_when_detail_is_missing() {
    // Given: A 400 carrying a list of validation errors
    let dir = tempdir().expect("tempdir");
    let input = write_input(dir.path(), "pUC19.dna", "native bytes");
    let body = r#"{"httpCode":400,"errorCode":7,"message":"invalid cfg","errors":["exportFilter: must not be null","cfg: unreadable"]}"#;
    let server = FakeServer::failing(EXPORT, Ok(HttpResponse::new(400, body)));
    let client = client(server.clone(), dir.path());

    // When: The export is requested
    let error = client
        .export_dna_file(&input, &ExportDnaFileConfig::new(ExportFilter::Fasta))
        .await
        .expect_err("validation error");

    // Then: The list becomes the detail
    assert_eq!(error.error_code(), 7);
    assert_eq!(
        error.detail(),
        "exportFilter: must not be null; cfg: unreadable"
    );
}

#[tokio::test]
async fn timeouts_are_reported_as_gateway_timeouts() {
    let dir = tempdir().expect("tempdir");
    let server = FakeServer::failing(STATUS, Err(HttpError::timeout("deadline elapsed")));
    let client = client(server.clone(), dir.path());

    let error = client.status().await.expect_err("timeout");

    assert_eq!(error.http_code(), 504);
    assert_eq!(error.kind(), FailureKind::Transport);
    assert_eq!(server.calls_to(STATUS), 3);
}

// =============================================================================
// Circuit-open failures
// =============================================================================

#[tokio::test]
async fn circuit_open_failure_serializes_like_any_other() {
    // Given: An open breaker
    let dir = tempdir().expect("tempdir");
    let server = FakeServer::failing(STATUS, Err(HttpError::connect("refused")));
    let client = client_with(server.clone(), fast_policy(3), dir.path());
    assert!(client.status().await.is_err());

    // When: Another call is rejected
    let error = client.status().await.expect_err("open circuit");

    // Then: It carries the standard error fields
    let json = serde_json::to_value(&error).expect("serializable");
    assert_eq!(json["httpCode"], 503);
    assert_eq!(json["errorCode"], 503);
    assert_eq!(
        json["message"],
        "CircuitBreaker 'snapgene' is OPEN and does not permit further calls"
    );
    assert!(json["detail"].is_string());

    let parsed: ApiError = serde_json::from_value(json).expect("deserializable");
    assert_eq!(parsed, error);
}

// =============================================================================
// Local file system
// =============================================================================

#[tokio::test]
async fn output_name_with_directories_is_stored_inside_work_dir() {
    // Given: A server returning a path-like output name
    let root = tempdir().expect("tempdir");
    let work_dir = root.path().join("work");
    let input = write_input(root.path(), "pUC19.gb", GENBANK);
    let server = FakeServer::failing(IMPORT, Ok(output_file("../../escaped.dna")));
    let client = client(server.clone(), &work_dir);

    // When: The file is converted to the native format
    let native = client.convert_to_native(&input).await.expect("conversion");

    // Then: Only the last component is used, under the work directory
    assert_eq!(native.path(), work_dir.join("escaped.dna"));
    assert_eq!(
        std::fs::read(native.path()).expect("stored"),
        download_body("../../escaped.dna")
    );
    assert!(!root.path().join("escaped.dna").exists());
}

#[tokio::test]
async fn unwritable_work_dir_fails_before_the_target_operation() {
    // Given: A work directory path that is actually a file
    let root = tempdir().expect("tempdir");
    let blocker = write_input(root.path(), "not-a-dir", "occupied");
    let input = write_input(root.path(), "pUC19.gb", GENBANK);
    let server = FakeServer::healthy();
    let client = client(server.clone(), &blocker);

    // When: An export is requested
    let error = client
        .export_dna_file(&input, &ExportDnaFileConfig::new(ExportFilter::Fasta))
        .await
        .expect_err("cannot store native file");

    // Then: A local I/O failure with the native conversion detail
    assert_eq!(error.kind(), FailureKind::LocalIo);
    assert_eq!(error.http_code(), 400);
    assert_eq!(error.error_code(), 400);
    assert_eq!(error.detail(), NATIVE_CONVERSION_DETAIL);

    // And: The export itself was never sent
    assert_eq!(server.routes_called(), vec![IMPORT, DOWNLOAD]);
    assert_eq!(server.calls_to(EXPORT), 0);
}
