use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a round trip to the optimization service produced no usable state.
///
/// Crosses the wasm boundary as `{"kind": "...", "detail": ...}`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServiceError {
    /// The request never produced an HTTP response (network, CORS, ...).
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {after_ms} ms")]
    Timeout { after_ms: u32 },
    /// The service answered with its error envelope.
    #[error("service rejected request ({code}): {message}")]
    Rejected { code: u16, message: String },
    /// The body could not be decoded as a response envelope.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Invalid configuration or parameter JSON handed in by the host.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}
