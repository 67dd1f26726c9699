//! Scripted in-memory conversion server shared by the behavior tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use seqconv_core::{
    ClientConfig, ConversionClient, HttpClient, HttpError, HttpRequest, HttpResponse,
    ResilienceFacade, ResiliencePolicy,
};

pub const STATUS: &str = "status";
pub const IMPORT: &str = "importDNAFile";
pub const EXPORT: &str = "exportDNAFile";
pub const EXPORT_PNG: &str = "exportPng";
pub const EXPORT_SVG: &str = "exportSvg";
pub const ENZYMES: &str = "reportEnzymes";
pub const ORFS: &str = "reportORFs";
pub const DOWNLOAD: &str = "downloadFile";

pub const IMPORTED_NAME: &str = "alpha-2-macroglobulin-5f1c.dna";
pub const STATUS_PAYLOAD: &str = r#"{"status":"UP","version":"0.0.7","uptime":{"seconds":3600}}"#;
pub const ENZYME_REPORT: &str = r#"{"count":26,"setName":"Unique & Dual Cutters"}"#;
pub const ORF_REPORT: &str = r#"{"ORFs":[{"start":12,"end":480,"frame":1}]}"#;

/// Fake upstream that answers by route and records every request.
///
/// Routes without an override answer like a healthy server; downloads echo
/// the requested file name so chained stages can be told apart.
#[derive(Debug, Default)]
pub struct FakeServer {
    overrides: Mutex<HashMap<String, Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeServer {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(route: &str, outcome: Result<HttpResponse, HttpError>) -> Arc<Self> {
        let server = Self::default();
        server.set(route, outcome);
        Arc::new(server)
    }

    /// Replaces the answer of `route` from now on.
    pub fn set(&self, route: &str, outcome: Result<HttpResponse, HttpError>) {
        self.overrides
            .lock()
            .expect("override store should not be poisoned")
            .insert(route.to_owned(), outcome);
    }

    pub fn restore(&self, route: &str) {
        self.overrides
            .lock()
            .expect("override store should not be poisoned")
            .remove(route);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    /// Routes hit so far, in call order.
    pub fn routes_called(&self) -> Vec<String> {
        self.requests().iter().map(|r| route_of(&r.url)).collect()
    }

    pub fn calls_to(&self, route: &str) -> usize {
        self.routes_called().iter().filter(|r| *r == route).count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests().len()
    }

    fn answer(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let route = route_of(&request.url);
        if let Some(outcome) = self
            .overrides
            .lock()
            .expect("override store should not be poisoned")
            .get(&route)
        {
            return outcome.clone();
        }

        match route.as_str() {
            STATUS => Ok(HttpResponse::ok_json(STATUS_PAYLOAD)),
            IMPORT => Ok(output_file(IMPORTED_NAME)),
            EXPORT => Ok(output_file("export-9a2e.fasta")),
            EXPORT_PNG => Ok(output_file("map-77b1.png")),
            EXPORT_SVG => Ok(output_file("map-77b2.svg")),
            ENZYMES => Ok(HttpResponse::ok_json(ENZYME_REPORT)),
            ORFS => Ok(HttpResponse::ok_json(ORF_REPORT)),
            DOWNLOAD => Ok(HttpResponse::ok(download_body(
                &query_param(&request.url, "fileName").unwrap_or_default(),
            ))),
            _ => Ok(HttpResponse::new(404, Vec::new())),
        }
    }
}

impl HttpClient for FakeServer {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let outcome = self.answer(&request);
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        Box::pin(async move { outcome })
    }
}

/// Bytes the fake server returns when `file_name` is downloaded.
pub fn download_body(file_name: &str) -> Vec<u8> {
    format!("bytes of {file_name}").into_bytes()
}

pub fn output_file(name: &str) -> HttpResponse {
    HttpResponse::ok_json(format!(r#"{{"outputFileName":"{name}"}}"#))
}

pub fn server_error() -> HttpResponse {
    HttpResponse::new(
        500,
        br#"{"httpCode":500,"errorCode":1,"message":"server error","detail":"exception message"}"#
            .to_vec(),
    )
}

pub fn client_error(message: &str) -> HttpResponse {
    HttpResponse::new(
        400,
        format!(r#"{{"httpCode":400,"errorCode":2,"message":"{message}","detail":"rejected"}}"#)
            .into_bytes(),
    )
}

/// Last path segment of the `/snapgene/...` URL, without the query.
pub fn route_of(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path).to_owned()
}

pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_owned())
        })
    })
}

/// Millisecond backoff so retry tests stay fast.
pub fn fast_policy(sliding_window_size: usize) -> ResiliencePolicy {
    ResiliencePolicy::new(Duration::from_millis(1), sliding_window_size)
}

pub fn client_with(
    server: Arc<FakeServer>,
    policy: ResiliencePolicy,
    work_dir: &Path,
) -> ConversionClient {
    let config = ClientConfig::new("http://somewhere.com")
        .expect("valid url")
        .with_customer_id("resilience-test")
        .expect("valid customer id")
        .with_work_dir(work_dir)
        .with_policy(policy);
    let facade = Arc::new(ResilienceFacade::new("snapgene", policy));
    ConversionClient::with_http_client(config, server, facade)
}

/// Client with a window large enough that the breaker never trips.
pub fn client(server: Arc<FakeServer>, work_dir: &Path) -> ConversionClient {
    client_with(server, fast_policy(200), work_dir)
}

pub fn write_input(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("input file should be writable");
    path
}
