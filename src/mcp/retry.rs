//! Error classification and backoff schedule for the retry/backoff engine
//!
//! Centralizes the transient-vs-fatal and retryable-status-vs-stale-session
//! decisions (`spec.md` §4.E) in one place, addressing the open question
//! about substring-based transient detection by checking `reqwest`'s
//! structured classification hooks first and falling back to text matching
//! only for compatibility with transport errors that don't expose one.

use reqwest::StatusCode;
use std::time::Duration;

/// Maximum number of retries per request (four attempts total).
pub const MAX_RETRIES: u32 = 3;
/// Base delay for the exponential backoff schedule.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Substrings that mark a transport error as transient when `reqwest`'s
/// structured hooks don't already classify it.
const TRANSIENT_SUBSTRINGS: &[&str] = &[
    "fetch",
    "network",
    "econnrefused",
    "econnreset",
    "etimedout",
    "socket",
    "abort",
];

/// How a non-2xx HTTP status or transport error should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 5xx or 429; retry with backoff.
    Retryable,
    /// 400 or 404; trigger a re-mint, then retry.
    StaleSession,
    /// Any other 4xx; stop immediately.
    NonRetryable,
}

/// Classify a `reqwest::Error` as transient (network-layer or body-decode,
/// retry-worthy).
///
/// Checks the structured `is_connect`/`is_timeout`/`is_request`/`is_decode`
/// hooks before falling back to a case-insensitive substring match on the
/// error's `Display` text. A 2xx response whose body fails to parse as JSON
/// surfaces as a decode error here and is worth one more attempt rather than
/// treating a truncated or empty body as fatal.
pub fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_connect() || err.is_timeout() || err.is_request() || err.is_decode() {
        return true;
    }
    let text = err.to_string().to_ascii_lowercase();
    TRANSIENT_SUBSTRINGS
        .iter()
        .any(|needle| text.contains(needle))
}

/// Classify a non-2xx HTTP status per `spec.md` §4.E.
pub fn classify_status(status: StatusCode) -> ErrorClass {
    if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
        ErrorClass::StaleSession
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        ErrorClass::Retryable
    } else {
        ErrorClass::NonRetryable
    }
}

/// Delay before retry attempt `attempt` (1-based, the attempt that just
/// failed): `RETRY_DELAY_MS * 2^(attempt - 1)`.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_DELAY_MS * 2u64.pow(attempt.saturating_sub(1)))
}
