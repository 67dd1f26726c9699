//! # seqconv core
//!
//! Resilient client for a remote SnapGene conversion server.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`circuit_breaker`] | Sliding-window circuit breaker |
//! | [`client`] | Conversion client and multi-step conversion chains |
//! | [`config`] | Client configuration from code or environment |
//! | [`error`] | Structured failures (`ApiError`) and `CallResult` |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`requests`] | Request configs and response payloads |
//! | [`resilience`] | Retry + circuit breaker facade |
//! | [`retry`] | Retry budget and backoff |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use seqconv_core::{ClientConfig, ConversionClient, ExportDnaFileConfig, ExportFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ConversionClient::new(ClientConfig::from_env()?);
//!
//!     // GenBank in, FASTA out; the native .dna round trip happens inside.
//!     let exported = client
//!         .export_dna_file("pUC19.gb", &ExportDnaFileConfig::new(ExportFilter::Fasta))
//!         .await?;
//!     let fasta = client.download_file(&exported.output_file_name).await?;
//!     println!("{} bytes", fasta.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ ConversionClient │  chains: native conversion, export, reports, PNG
//! └────────┬─────────┘
//!          │ one call per remote operation
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ ResilienceFacade │────▶│ Circuit Breaker  │
//! │ (retry budget)   │     │ (sliding window) │
//! └────────┬─────────┘     └──────────────────┘
//!          │ one call per attempt
//!          ▼
//! ┌──────────────────┐
//! │ HttpClient       │
//! │ (reqwest / fake) │
//! └──────────────────┘
//! ```

pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod requests;
pub mod resilience;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

pub use client::{is_native_file_name, ConversionClient, NativeFile, NATIVE_EXTENSION};

pub use config::ClientConfig;

pub use error::{ApiError, CallResult, ConfigError, FailureKind};

pub use http_client::{
    FormPart, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    MultipartForm, ReqwestHttpClient,
};

pub use requests::{
    ConversionResponse, EnzymeSet, ExportDnaFileConfig, ExportFilter, ImportDnaFileConfig,
    MapConfig, Operation, PngMapConfig, ReadingFrame, ReportEnzymesConfig, ReportOrfsConfig,
    SvgMapConfig,
};

pub use resilience::{ResilienceFacade, ResiliencePolicy, DEFAULT_DEPENDENCY};

pub use retry::{Backoff, RetryPolicy};
