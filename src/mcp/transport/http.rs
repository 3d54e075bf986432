//! HTTP transport: one POST per message (`spec.md` §4.B, §6)
//!
//! Mirrors the request-building half of the teacher's `HttpTransport`
//! (header composition, status branching, `Content-Type` dispatch) but
//! drops everything the teacher bundled alongside it that this proxy
//! models elsewhere: session storage lives in `session.rs`, retry
//! classification in `retry.rs`, and SSE draining in `sse.rs`. This type
//! does exactly one thing: issue the POST and hand back the raw outcome.

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;

/// Request headers to attach to an upstream POST, per `spec.md` §3/§6.
///
/// Built fresh for every POST from the session manager's current state;
/// this type carries no logic of its own beyond applying itself to a
/// `reqwest::RequestBuilder`.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    pub token: String,
    pub space_id: Option<String>,
    pub session_id: Option<String>,
}

impl RequestHeaders {
    fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut builder = builder
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json, text/event-stream");
        if let Some(space_id) = &self.space_id {
            builder = builder.header("Current-Space-Id", space_id);
        }
        if let Some(session_id) = &self.session_id {
            builder = builder.header("Mcp-Session-Id", session_id);
        }
        builder
    }
}

/// The response body, before any SSE parsing happens.
pub enum Body {
    /// `Content-Type` was not `text/event-stream`: the whole body, parsed
    /// as one JSON object.
    Json(serde_json::Value),
    /// `Content-Type` was `text/event-stream`: an unread byte stream handed
    /// to `sse::drain` for incremental parsing. Never buffered here.
    Sse(Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>),
}

/// The outcome of one POST: status, any captured session id header, and
/// the body in whichever shape the server chose.
pub struct PostResult {
    pub status: reqwest::StatusCode,
    pub session_id: Option<String>,
    pub body: Body,
}

/// Issues one POST per call; does no retrying or error classification.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: url::Url,
}

impl HttpTransport {
    pub fn new(endpoint: url::Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client with static configuration");
        Self { client, endpoint }
    }

    /// `post(message) -> (status, headers, body-stream)` per `spec.md` §4.B.
    ///
    /// Returns `Err` only for a network-layer failure (connection refused,
    /// reset, timeout, DNS, abort); any HTTP status the server returns,
    /// including 4xx/5xx, is surfaced as `Ok(PostResult)` for the caller to
    /// classify.
    pub async fn post(
        &self,
        message: &serde_json::Value,
        headers: &RequestHeaders,
    ) -> reqwest::Result<PostResult> {
        let builder = headers.apply(self.client.post(self.endpoint.clone()).json(message));
        let response = builder.send().await?;

        let status = response.status();
        let session_id = response
            .headers()
            .get("Mcp-Session-Id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let is_event_stream = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/event-stream"))
            .unwrap_or(false);

        let body = if is_event_stream {
            Body::Sse(Box::pin(response.bytes_stream()))
        } else if status.is_success() {
            // A 2xx status with a body that fails to parse as JSON (empty
            // body, plain-text error page, truncated response) is still an
            // upstream failure, not a `null` result: propagate it so the
            // caller's retry/fallback machinery handles it like any other
            // transport error instead of writing a bare `null` downstream.
            Body::Json(response.json::<serde_json::Value>().await?)
        } else {
            // Non-2xx bodies are never inspected by the coordinator (status
            // alone drives the retry/stale-session/non-retryable branch),
            // so a non-JSON error page here is harmless.
            match response.json::<serde_json::Value>().await {
                Ok(value) => Body::Json(value),
                Err(_) => Body::Json(serde_json::Value::Null),
            }
        };

        Ok(PostResult {
            status,
            session_id,
            body,
        })
    }
}
