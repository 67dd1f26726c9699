//! Structured failures returned by every upstream call.
//!
//! Every operation of the conversion client yields a [`CallResult`]. The
//! failure side is always an [`ApiError`], either parsed from the error body
//! the server sent or synthesized locally when no usable body exists
//! (transport failure, open circuit, local I/O).

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client::{HttpError, HttpErrorKind, HttpResponse};

/// Result of a facade-mediated call.
pub type CallResult<T> = Result<T, ApiError>;

/// Longest raw body excerpt copied into a synthesized failure's detail.
const MAX_DETAIL_BYTES: usize = 512;

/// Detail attached to failures raised while preparing the native file.
pub const NATIVE_CONVERSION_DETAIL: &str =
    "Could not convert file to native .dna file - IO exception before sending";

/// Failure classification used by the retry policy and by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 4xx answer; caller-caused and never retried.
    Client,
    /// 5xx answer.
    Server,
    /// Connect failure, timeout, or an error response whose body could not be parsed.
    Transport,
    /// Rejected by the circuit breaker without attempting the call.
    CircuitOpen,
    /// Local file-system failure before or between remote calls.
    LocalIo,
    /// Successful status whose payload could not be decoded.
    Decode,
}

impl FailureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
            Self::Transport => "transport",
            Self::CircuitOpen => "circuit_open",
            Self::LocalIo => "local_io",
            Self::Decode => "decode",
        }
    }

    pub const fn retryable(self) -> bool {
        matches!(self, Self::Server | Self::Transport)
    }

    fn from_status(status: u16) -> Self {
        if (400..500).contains(&status) {
            Self::Client
        } else {
            Self::Server
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure carried by [`CallResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    http_code: u16,
    error_code: i32,
    message: String,
    detail: String,
    kind: FailureKind,
}

/// Error body shape returned by the conversion server.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamErrorBody {
    #[serde(default)]
    http_code: Option<u16>,
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl ApiError {
    pub fn new(
        kind: FailureKind,
        http_code: u16,
        error_code: i32,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            http_code,
            error_code,
            message: message.into(),
            detail: detail.into(),
            kind,
        }
    }

    /// Translates a non-2xx response.
    ///
    /// A JSON body with at least a message is taken at face value; anything
    /// else is reported as a transport failure carrying the raw body.
    pub fn from_response(response: &HttpResponse) -> Self {
        let status = response.status;
        match serde_json::from_slice::<UpstreamErrorBody>(&response.body) {
            Ok(body) if body.message.is_some() || body.detail.is_some() => {
                let detail = body
                    .detail
                    .or_else(|| (!body.errors.is_empty()).then(|| body.errors.join("; ")))
                    .unwrap_or_default();
                Self {
                    http_code: body.http_code.unwrap_or(status),
                    error_code: body.error_code.unwrap_or(i32::from(status)),
                    message: body.message.unwrap_or_default(),
                    detail,
                    kind: FailureKind::from_status(status),
                }
            }
            _ => {
                let kind = if (400..500).contains(&status) {
                    FailureKind::Client
                } else {
                    FailureKind::Transport
                };
                Self {
                    http_code: status,
                    error_code: i32::from(status),
                    message: format!("upstream returned status {status} without a structured error body"),
                    detail: excerpt(&response.body),
                    kind,
                }
            }
        }
    }

    /// Synthesizes a failure for a call that never produced a response.
    pub fn from_transport(error: &HttpError) -> Self {
        let (http_code, label) = match error.kind() {
            HttpErrorKind::Timeout => (504, "request timed out"),
            HttpErrorKind::Connect => (503, "connection failed"),
            HttpErrorKind::Other => (500, "request failed"),
        };
        Self {
            http_code,
            error_code: i32::from(http_code),
            message: label.to_owned(),
            detail: error.message().to_owned(),
            kind: FailureKind::Transport,
        }
    }

    pub fn circuit_open(dependency: &str) -> Self {
        Self {
            http_code: 503,
            error_code: 503,
            message: format!(
                "CircuitBreaker '{dependency}' is OPEN and does not permit further calls"
            ),
            detail: format!("calls to '{dependency}' are suspended until the breaker cools down"),
            kind: FailureKind::CircuitOpen,
        }
    }

    /// Local I/O failure while preparing or handing over a file.
    pub fn local_io(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            http_code: 400,
            error_code: 400,
            message: message.into(),
            detail: detail.into(),
            kind: FailureKind::LocalIo,
        }
    }

    pub fn decode(what: &str, cause: impl Display) -> Self {
        Self {
            http_code: 502,
            error_code: 502,
            message: format!("could not decode {what} returned by upstream"),
            detail: cause.to_string(),
            kind: FailureKind::Decode,
        }
    }

    pub const fn http_code(&self) -> u16 {
        self.http_code
    }

    pub const fn error_code(&self) -> i32 {
        self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    pub const fn retryable(&self) -> bool {
        self.kind.retryable()
    }

    pub const fn is_client_error(&self) -> bool {
        self.http_code >= 400 && self.http_code < 500
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, http {})", self.message, self.kind, self.http_code)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Invalid client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid server url '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("setting '{name}' must be a non-negative integer: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("setting '{name}' must be between {min} and {max}: {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
    #[error("customer id cannot be empty")]
    EmptyCustomerId,
}

fn excerpt(body: &[u8]) -> String {
    let end = body.len().min(MAX_DETAIL_BYTES);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
