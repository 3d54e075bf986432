//! Session manager: session id lifecycle and re-mint (`spec.md` §4.D)
//!
//! Immutable fields (`token`, `space_id`, `upstream_url`) are plain struct
//! fields set once at construction; the mutable triple (`session_id`,
//! `last_init_params`, `initialized`) lives behind one `RwLock`, the same
//! split the teacher's `HttpTransport` uses for its own `session_id` field.

use crate::error::{ProxyError, Result};
use crate::mcp::cache::Cache;
use crate::mcp::transport::http::{Body, HttpTransport, RequestHeaders};
use crate::mcp::transport::sse;
use crate::mcp::types::{METHOD_INITIALIZE, METHOD_INITIALIZED_NOTIFICATION};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Mutable {
    session_id: Option<String>,
    last_init_params: Option<Value>,
    initialized: bool,
}

/// Holds the proxy's upstream identity and current session state.
pub struct SessionManager {
    token: String,
    space_id: Option<String>,
    mutable: RwLock<Mutable>,
    reinit_counter: AtomicU64,
}

impl SessionManager {
    pub fn new(token: String, space_id: Option<String>) -> Self {
        Self {
            token,
            space_id,
            mutable: RwLock::new(Mutable::default()),
            reinit_counter: AtomicU64::new(0),
        }
    }

    /// Build the headers the transport should attach to the next POST,
    /// reflecting the session id at the moment this is called.
    pub async fn headers(&self) -> RequestHeaders {
        let mutable = self.mutable.read().await;
        RequestHeaders {
            token: self.token.clone(),
            space_id: self.space_id.clone(),
            session_id: mutable.session_id.clone(),
        }
    }

    pub async fn session_id(&self) -> Option<String> {
        self.mutable.read().await.session_id.clone()
    }

    /// Overwrite `sessionId` whenever a response carries the header,
    /// regardless of whether one was already set.
    pub async fn capture_session_id(&self, session_id: Option<String>) {
        if let Some(id) = session_id {
            self.mutable.write().await.session_id = Some(id);
        }
    }

    /// Clear the session id; called on a transient transport failure and
    /// unconditionally at the start of a re-mint.
    pub async fn clear_session(&self) {
        self.mutable.write().await.session_id = None;
    }

    pub async fn capture_init_params(&self, params: Option<Value>) {
        self.mutable.write().await.last_init_params = params;
    }

    pub async fn mark_initialized(&self) {
        self.mutable.write().await.initialized = true;
    }

    fn default_init_params() -> Value {
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "vaiz-mcp-proxy",
                "version": "1.0.0",
            },
        })
    }

    /// Re-mint: unconditionally clear `sessionId`/`initialized`, POST a
    /// synthetic `initialize`, capture the new session id, cache the
    /// result if present, and fire-and-forget `notifications/initialized`.
    pub async fn reinit(&self, http: &HttpTransport, cache: &Cache) -> Result<()> {
        self.clear_session().await;
        {
            let mut mutable = self.mutable.write().await;
            mutable.initialized = false;
        }

        let params = {
            let mutable = self.mutable.read().await;
            mutable
                .last_init_params
                .clone()
                .unwrap_or_else(Self::default_init_params)
        };
        let id = format!("_reinit_{}", self.reinit_counter.fetch_add(1, Ordering::SeqCst));
        let message = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": METHOD_INITIALIZE,
            "params": params,
        });

        let headers = self.headers().await;
        let post = http
            .post(&message, &headers)
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))?;
        self.capture_session_id(post.session_id.clone()).await;

        if !post.status.is_success() {
            return Err(ProxyError::Upstream(format!(
                "re-mint failed with HTTP {}",
                post.status
            ))
            .into());
        }

        let target_id = Value::String(id);
        let matched = match post.body {
            Body::Json(value) => Some(value),
            Body::Sse(stream) => sse::drain_silent(stream, &target_id).await?,
        };
        if let Some(value) = &matched {
            if value.get("result").is_some() {
                if let Ok(response) =
                    serde_json::from_value::<crate::mcp::types::JsonRpcResponse>(value.clone())
                {
                    cache.put(METHOD_INITIALIZE, &response).await;
                }
            }
        }

        self.mark_initialized().await;

        // Fire-and-forget: failures never propagate past this task.
        let notif = json!({"jsonrpc": "2.0", "method": METHOD_INITIALIZED_NOTIFICATION});
        let notif_headers = self.headers().await;
        let http = http.clone();
        tokio::spawn(async move {
            let _ = http.post(&notif, &notif_headers).await;
        });

        Ok(())
    }
}
