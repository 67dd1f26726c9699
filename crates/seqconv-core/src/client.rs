//! Conversion client: single remote operations and the chains built on them.
//!
//! Several server operations (DNA export, enzyme and ORF reports) only accept
//! the server's native `.dna` format. The chain operations convert other
//! formats first: import → download the produced `.dna` → re-upload it to the
//! target operation. A chain stops at the first failing stage and returns that
//! stage's [`ApiError`] untouched.
//!
//! ```text
//! export_dna_file(file)
//!   ├─ file is *.dna ─────────────────────────────▶ exportDNAFile(file)
//!   └─ otherwise ─▶ importDNAFile(file) ─▶ downloadFile(name) ─▶ exportDNAFile(tmp/name)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Url;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, UNDEFINED_CUSTOMER};
use crate::error::{ApiError, CallResult, NATIVE_CONVERSION_DETAIL};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, MultipartForm, ReqwestHttpClient};
use crate::requests::{
    ConversionResponse, ExportDnaFileConfig, ImportDnaFileConfig, Operation, PngMapConfig,
    ReportEnzymesConfig, ReportOrfsConfig, SvgMapConfig,
};
use crate::resilience::{ResilienceFacade, DEFAULT_DEPENDENCY};

/// Extension of the server's native file format, compared case-insensitively.
pub const NATIVE_EXTENSION: &str = "dna";

/// Whether a file name already carries the native extension.
///
/// Looks only at the name; the file is never opened.
pub fn is_native_file_name(file_name: &str) -> bool {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    base.rsplit_once('.')
        .is_some_and(|(_, extension)| extension.eq_ignore_ascii_case(NATIVE_EXTENSION))
}

/// Native-format file feeding the remaining stages of one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFile {
    path: PathBuf,
    intermediate: bool,
}

impl NativeFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when the file was produced by import + download rather than
    /// supplied by the caller.
    pub const fn is_intermediate(&self) -> bool {
        self.intermediate
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// Removes an intermediate file; caller-supplied files are left alone.
    async fn discard(self) {
        if !self.intermediate {
            return;
        }
        if let Err(error) = tokio::fs::remove_file(&self.path).await {
            debug!(
                path = %self.path.display(),
                %error,
                "could not remove intermediate native file"
            );
        }
    }
}

/// Client for the conversion server.
///
/// Every remote call goes through one shared [`ResilienceFacade`], so retry
/// budgets are per call while the circuit breaker sees all traffic.
pub struct ConversionClient {
    http_client: Arc<dyn HttpClient>,
    facade: Arc<ResilienceFacade>,
    base_url: Url,
    customer_id: String,
    work_dir: PathBuf,
}

impl ConversionClient {
    /// Production client backed by reqwest.
    pub fn new(config: ClientConfig) -> Self {
        let http_client = Arc::new(ReqwestHttpClient::new(config.connect_timeout));
        let facade = Arc::new(ResilienceFacade::new(DEFAULT_DEPENDENCY, config.policy));
        Self::with_http_client(config, http_client, facade)
    }

    pub fn with_http_client(
        config: ClientConfig,
        http_client: Arc<dyn HttpClient>,
        facade: Arc<ResilienceFacade>,
    ) -> Self {
        Self {
            http_client,
            facade,
            base_url: config.base_url,
            customer_id: config.customer_id,
            work_dir: config.work_dir,
        }
    }

    pub fn facade(&self) -> &Arc<ResilienceFacade> {
        &self.facade
    }

    /// Swaps the resilience policy. Requires exclusive access, so no call can
    /// be in flight on this client while it happens.
    pub fn replace_facade(&mut self, facade: Arc<ResilienceFacade>) {
        self.facade = facade;
    }

    /// Takes the customer id from `supplier` when the configuration left it
    /// unset (blank or [`UNDEFINED_CUSTOMER`]). A configured id wins and the
    /// supplier is never called; a blank supplied id is ignored.
    pub fn with_customer_id_supplier<F>(mut self, supplier: F) -> Self
    where
        F: FnOnce() -> String,
    {
        if !self.customer_id.trim().is_empty() && self.customer_id != UNDEFINED_CUSTOMER {
            return self;
        }
        let supplied = supplier();
        if supplied.trim().is_empty() {
            warn!("customer id supplier returned a blank id, keeping the configured one");
        } else {
            self.customer_id = supplied;
        }
        self
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Health check; the server's JSON payload is returned unmodified.
    pub async fn status(&self) -> CallResult<String> {
        let response = self.execute(HttpRequest::get(self.endpoint("status"))).await?;
        decode_text(response)
    }

    /// Renders a map as SVG. Any supported input format is accepted.
    pub async fn convert_to_svg_file(
        &self,
        file: impl AsRef<Path>,
        config: &SvgMapConfig,
    ) -> CallResult<ConversionResponse> {
        self.upload(Operation::ExportSvg, file.as_ref(), config)
            .await
            .and_then(decode_conversion)
    }

    /// Renders a map as PNG. Any supported input format is accepted.
    pub async fn convert_to_png_file(
        &self,
        file: impl AsRef<Path>,
        config: &PngMapConfig,
    ) -> CallResult<ConversionResponse> {
        self.upload(Operation::ExportPng, file.as_ref(), config)
            .await
            .and_then(decode_conversion)
    }

    /// Uploads `file` for conversion into the native format, whatever its
    /// current format.
    pub async fn import_dna_file(&self, file: impl AsRef<Path>) -> CallResult<ConversionResponse> {
        self.upload(
            Operation::ImportDna,
            file.as_ref(),
            &ImportDnaFileConfig::default(),
        )
        .await
        .and_then(decode_conversion)
    }

    /// Fetches a file produced by an earlier operation.
    pub async fn download_file(&self, output_file_name: &str) -> CallResult<Vec<u8>> {
        let url = format!(
            "{}?fileName={}&customerId={}",
            self.endpoint("downloadFile"),
            urlencoding::encode(output_file_name),
            urlencoding::encode(&self.customer_id),
        );
        let response = self.execute(HttpRequest::get(url)).await?;
        Ok(response.body)
    }

    /// Returns `file` itself when it is already native; otherwise imports it,
    /// downloads the result and writes it to the work directory under the
    /// server's output file name. The caller owns the returned file.
    pub async fn convert_to_native(&self, file: impl AsRef<Path>) -> CallResult<NativeFile> {
        let file = file.as_ref();
        if is_native_file_name(&file.to_string_lossy()) {
            info!(path = %file.display(), "already a native .dna file");
            return Ok(NativeFile {
                path: file.to_path_buf(),
                intermediate: false,
            });
        }

        let imported = self.import_dna_file(file).await.inspect_err(|error| {
            warn!(path = %file.display(), %error, "importing non-native file failed");
        })?;

        let bytes = self
            .download_file(&imported.output_file_name)
            .await
            .inspect_err(|error| {
                warn!(
                    output_file_name = %imported.output_file_name,
                    %error,
                    "downloading converted file failed"
                );
            })?;

        let path = self.store_native(&imported.output_file_name, &bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "stored intermediate native file");
        Ok(NativeFile {
            path,
            intermediate: true,
        })
    }

    /// Exports to another sequence format, converting to native first if needed.
    pub async fn export_dna_file(
        &self,
        file: impl AsRef<Path>,
        config: &ExportDnaFileConfig,
    ) -> CallResult<ConversionResponse> {
        let native = self.convert_to_native(file).await?;
        let result = self
            .upload(Operation::ExportDna, native.path(), config)
            .await
            .and_then(decode_conversion);
        native.discard().await;
        result
    }

    /// Restriction enzyme report as JSON text, converting to native first if needed.
    pub async fn enzymes(
        &self,
        file: impl AsRef<Path>,
        config: &ReportEnzymesConfig,
    ) -> CallResult<String> {
        self.native_report(Operation::ReportEnzymes, file.as_ref(), config)
            .await
    }

    /// Open reading frame report as JSON text, converting to native first if needed.
    pub async fn orfs(
        &self,
        file: impl AsRef<Path>,
        config: &ReportOrfsConfig,
    ) -> CallResult<String> {
        self.native_report(Operation::ReportOrfs, file.as_ref(), config)
            .await
    }

    /// Native conversion, PNG rendering and download in one chain.
    ///
    /// A failed PNG stage is returned as a failure; no bytes accompany it.
    pub async fn upload_and_download_png(
        &self,
        file: impl AsRef<Path>,
        config: &PngMapConfig,
    ) -> CallResult<Vec<u8>> {
        let native = self.convert_to_native(file).await?;
        let png = self.convert_to_png_file(native.path(), config).await;
        native.discard().await;

        let png = png.inspect_err(|error| {
            warn!(%error, "conversion to PNG failed");
        })?;
        self.download_file(&png.output_file_name).await
    }

    async fn native_report<C: Serialize>(
        &self,
        operation: Operation,
        file: &Path,
        config: &C,
    ) -> CallResult<String> {
        let native = self.convert_to_native(file).await?;
        let result = self
            .upload(operation, native.path(), config)
            .await
            .and_then(decode_text);
        native.discard().await;
        result
    }

    async fn upload<C: Serialize>(
        &self,
        operation: Operation,
        file: &Path,
        config: &C,
    ) -> CallResult<HttpResponse> {
        let form = self.upload_form(file, config).await?;
        debug!(%operation, path = %file.display(), "uploading file");
        self.execute(HttpRequest::post_form(self.endpoint(operation.path()), form))
            .await
    }

    async fn upload_form<C: Serialize>(&self, file: &Path, config: &C) -> CallResult<MultipartForm> {
        let content = tokio::fs::read(file).await.map_err(|error| {
            ApiError::local_io(
                format!("file '{}' cannot be resolved in the file system", file.display()),
                error.to_string(),
            )
        })?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned());
        let cfg = serde_json::to_string(config).map_err(|error| {
            ApiError::local_io("request config could not be serialized", error.to_string())
        })?;

        Ok(MultipartForm::new()
            .file("file", file_name, content)
            .text("cfg", cfg)
            .text("customerId", self.customer_id.as_str()))
    }

    async fn execute(&self, request: HttpRequest) -> CallResult<HttpResponse> {
        self.facade
            .call(|| self.http_client.execute(request.clone()))
            .await
    }

    /// Writes downloaded native bytes into the work directory.
    ///
    /// Only the last component of the server-provided name is used; a partly
    /// written file is removed before the failure is returned.
    async fn store_native(&self, output_file_name: &str, bytes: &[u8]) -> CallResult<PathBuf> {
        let file_name = Path::new(output_file_name)
            .file_name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                ApiError::local_io(
                    format!("server returned unusable output file name '{output_file_name}'"),
                    NATIVE_CONVERSION_DETAIL,
                )
            })?;
        let path = self.work_dir.join(file_name);

        let written = match tokio::fs::create_dir_all(&self.work_dir).await {
            Ok(()) => tokio::fs::write(&path, bytes).await,
            Err(error) => Err(error),
        };
        if let Err(error) = written {
            let _ = tokio::fs::remove_file(&path).await;
            warn!(path = %path.display(), %error, "writing native file failed");
            return Err(ApiError::local_io(error.to_string(), NATIVE_CONVERSION_DETAIL));
        }
        Ok(path)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/snapgene/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        )
    }
}

fn decode_conversion(response: HttpResponse) -> CallResult<ConversionResponse> {
    serde_json::from_slice(&response.body)
        .map_err(|error| ApiError::decode("conversion response", error))
}

fn decode_text(response: HttpResponse) -> CallResult<String> {
    String::from_utf8(response.body).map_err(|error| ApiError::decode("text payload", error))
}
