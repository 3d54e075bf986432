//! JSON-RPC 2.0 wire primitives and message classification
//!
//! This module carries only the JSON-RPC envelope types the proxy actually
//! needs. Unlike a typed MCP client, the proxy never deserializes `result`
//! or `params` into domain structs — it forwards `serde_json::Value` through
//! verbatim, so only `jsonrpc`/`id`/`method`/`result`/`error` are modeled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON-RPC method name for the handshake request.
pub const METHOD_INITIALIZE: &str = "initialize";
/// Notification sent by the local peer once `initialize` succeeds.
pub const METHOD_INITIALIZED_NOTIFICATION: &str = "notifications/initialized";
/// Method name for listing available tools; cacheable.
pub const METHOD_TOOLS_LIST: &str = "tools/list";
/// Notification the proxy pushes once the API recovers from an outage.
pub const NOTIF_TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";

/// Methods whose last successful response is cached (see `cache.rs`).
pub const CACHEABLE_METHODS: &[&str] = &[METHOD_INITIALIZE, METHOD_TOOLS_LIST];

/// The JSON-RPC error code the proxy uses for every error it synthesizes
/// itself (as opposed to passing through an upstream error verbatim).
pub const SYNTHESIZED_ERROR_CODE: i64 = -32000;

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code as defined by JSON-RPC 2.0 or the MCP spec.
    pub code: i64,
    /// Human-readable error description.
    pub message: String,
    /// Optional additional error context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl JsonRpcError {
    /// Build a proxy-synthesized error with [`SYNTHESIZED_ERROR_CODE`].
    pub fn synthesized(message: impl Into<String>) -> Self {
        Self {
            code: SYNTHESIZED_ERROR_CODE,
            message: message.into(),
            data: None,
        }
    }
}

/// A JSON-RPC 2.0 response object.
///
/// Exactly one of `result`/`error` is present on a well-formed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version identifier; always `"2.0"`.
    pub jsonrpc: String,
    /// Mirrors the `id` of the originating request.
    pub id: serde_json::Value,
    /// Successful result value; mutually exclusive with `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error object; mutually exclusive with `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Build a successful response carrying `result` for `id`.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build a synthesized error response for `id`.
    pub fn synthesized_error(id: serde_json::Value, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError::synthesized(message)),
        }
    }

    /// Re-key a cached response onto a different request id, as required
    /// when serving a cached `initialize`/`tools/list` result for a request
    /// whose id differs from the one the cached response was recorded under.
    pub fn rekeyed(&self, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: self.jsonrpc.clone(),
            id,
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// Classification of an inbound local message, computed structurally per
/// `spec.md` §4.A: the presence of a non-null `id` key distinguishes a
/// request from a notification. No other field is consulted.
#[derive(Debug, Clone)]
pub enum InboundMessage {
    /// A request awaiting a reply, carrying its id and method separately
    /// from the raw value so the coordinator never has to re-parse them.
    Request {
        id: serde_json::Value,
        method: String,
        raw: serde_json::Value,
    },
    /// A notification; no reply is ever sent.
    Notification {
        method: String,
        raw: serde_json::Value,
    },
}

impl InboundMessage {
    /// Classify a parsed JSON-RPC object from the local peer.
    ///
    /// Returns `None` if the object has no `method` field at all (malformed
    /// input that isn't a request or a notification either); the caller
    /// should log and drop such lines.
    pub fn classify(value: serde_json::Value) -> Option<Self> {
        let method = value.get("method")?.as_str()?.to_string();
        let has_id = value.get("id").map(|v| !v.is_null()).unwrap_or(false);
        if has_id {
            let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
            Some(InboundMessage::Request { id, method, raw: value })
        } else {
            Some(InboundMessage::Notification { method, raw: value })
        }
    }

    /// The method name, regardless of request/notification kind.
    pub fn method(&self) -> &str {
        match self {
            InboundMessage::Request { method, .. } => method,
            InboundMessage::Notification { method, .. } => method,
        }
    }

    /// The raw JSON-RPC object as received.
    pub fn raw(&self) -> &serde_json::Value {
        match self {
            InboundMessage::Request { raw, .. } => raw,
            InboundMessage::Notification { raw, .. } => raw,
        }
    }
}
