//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// Human-readable cause suitable for an error surface.
    pub fn user_message(&self) -> String {
        match self {
            SdkError::Http(e) => e.user_message(),
            SdkError::Form(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("No response received: {0}")]
    NoResponse(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request {status}: {detail:?}")]
    BadRequest { status: u16, detail: Option<String> },

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl HttpError {
    /// Normalized message for the error surface.
    pub fn user_message(&self) -> String {
        match self {
            HttpError::Forbidden(_) => "request forbidden, check credentials".to_string(),
            HttpError::RateLimited { .. } => "rate limit exceeded, wait and retry".to_string(),
            HttpError::ServerError { status: 500, .. } => {
                "server error, try again later".to_string()
            }
            HttpError::NoResponse(_) | HttpError::Timeout => {
                "network/connectivity error".to_string()
            }
            HttpError::ServerError { body, .. } => request_failed(error_detail(body).as_deref()),
            HttpError::NotFound(body) => request_failed(error_detail(body).as_deref()),
            HttpError::BadRequest { detail, .. } => request_failed(detail.as_deref()),
            #[cfg(feature = "http")]
            HttpError::Reqwest(_) => request_failed(None),
            HttpError::MaxRetriesExceeded { .. } => request_failed(None),
        }
    }
}

fn request_failed(detail: Option<&str>) -> String {
    match detail {
        Some(d) if !d.trim().is_empty() => format!("request failed: {}", d),
        _ => "request failed".to_string(),
    }
}

/// Extract the `error` field of a JSON error body, if there is one.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.as_str())
        .map(|s| s.to_string())
}

/// Conversion form rejections. Checked before any I/O.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("Please select both currencies")]
    MissingCurrency,

    #[error("Please enter a valid amount")]
    InvalidAmount,

    #[error("Cannot convert the same currency")]
    SameCurrency,
}

/// Durable key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
