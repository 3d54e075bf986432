//! Error types for the proxy
//!
//! This module defines all error types used throughout the proxy, using
//! `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for proxy operations.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Configuration/environment-variable error (e.g. missing `VAIZ_API_TOKEN`).
    #[error("configuration error: {0}")]
    Config(String),

    /// A line of local input could not be parsed as JSON.
    #[error("local parse error: {0}")]
    LocalParse(String),

    /// Network-layer failure talking to the upstream (connection refused,
    /// reset, timeout, DNS, abort).
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream returned a non-retryable 4xx status.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The SSE stream ended without an object whose id matched the
    /// originating request.
    #[error("No valid response received from SSE stream")]
    SseNoMatch,

    /// The upstream session has expired or was rejected (400/404).
    #[error("mcp session expired")]
    SessionExpired,

    /// Retries were exhausted and no fallback (cache or empty-tools) applies.
    #[error("API unavailable: {0}")]
    ApiUnavailable(String),

    /// IO errors (stdin/stdout).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors from the underlying client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for proxy operations.
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing rich error context and easy propagation with `?` at the crate
/// boundary, while internal code matches on [`ProxyError`] directly when it
/// needs to branch on error kind.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ProxyError::Config("missing VAIZ_API_TOKEN".to_string());
        assert_eq!(
            error.to_string(),
            "configuration error: missing VAIZ_API_TOKEN"
        );
    }

    #[test]
    fn sse_no_match_display() {
        let error = ProxyError::SseNoMatch;
        assert_eq!(
            error.to_string(),
            "No valid response received from SSE stream"
        );
    }

    #[test]
    fn api_unavailable_display() {
        let error = ProxyError::ApiUnavailable("retries exhausted".to_string());
        assert_eq!(error.to_string(), "API unavailable: retries exhausted");
    }

    #[test]
    fn io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ProxyError = io_error.into();
        assert!(matches!(error, ProxyError::Io(_)));
    }

    #[test]
    fn json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let error: ProxyError = json_error.into();
        assert!(matches!(error, ProxyError::Serialization(_)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProxyError>();
    }
}
