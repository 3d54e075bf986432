//! Request coordinator: orchestrates A–G for every inbound line
//! (`spec.md` §4.H)
//!
//! `Coordinator::handle_message` is the single entry point the line framer
//! calls for every non-blank inbound line. It never panics and never lets
//! an `Err` escape: every failure path is reified into a JSON-RPC response
//! object or silently dropped (notifications), per `spec.md` §7.

use crate::config::Config;
use crate::mcp::cache::Cache;
use crate::mcp::framer::OutputWriter;
use crate::mcp::health::{Health, HEALTH_CHECK_INTERVAL_MS};
use crate::mcp::retry::{self, ErrorClass};
use crate::mcp::session::SessionManager;
use crate::mcp::transport::http::{Body, HttpTransport};
use crate::mcp::transport::sse;
use crate::mcp::types::{
    InboundMessage, JsonRpcResponse, METHOD_INITIALIZE, METHOD_INITIALIZED_NOTIFICATION,
    METHOD_TOOLS_LIST, NOTIF_TOOLS_LIST_CHANGED,
};
use serde_json::Value;
use std::sync::Arc;

/// Outcome of one attempt cycle against the upstream, before the
/// coordinator applies "API is back" / retry-exhaustion bookkeeping.
enum Delivery {
    /// HTTP succeeded and (for SSE) a matching event was found; the
    /// response has already been written downstream and cached if
    /// applicable.
    Success,
    /// HTTP succeeded as an SSE stream but no event matched; the `-32000`
    /// error was already written downstream by the SSE reader itself.
    /// Does not count as an "API is back" signal.
    SseUnmatched,
    /// Retries (and any stale-session re-mint) were exhausted.
    Exhausted(String),
}

/// Shared engine state plus the orchestration logic that ties components
/// A–G together for each inbound message.
pub struct Coordinator {
    http: HttpTransport,
    session: SessionManager,
    cache: Cache,
    health: Health,
    out: Arc<OutputWriter>,
}

impl Coordinator {
    pub fn new(config: &Config, out: Arc<OutputWriter>) -> crate::error::Result<Arc<Self>> {
        let endpoint = url::Url::parse(&config.api_url)
            .map_err(|e| crate::error::ProxyError::Config(format!("invalid VAIZ_API_URL: {e}")))?;
        Ok(Arc::new(Self {
            http: HttpTransport::new(endpoint),
            session: SessionManager::new(config.token.clone(), config.space_id.clone()),
            cache: Cache::new(),
            health: Health::new(),
            out,
        }))
    }

    /// Dispatch one parsed inbound object: requests vs. notifications.
    pub async fn handle_message(self: Arc<Self>, value: Value) {
        match InboundMessage::classify(value) {
            None => {
                tracing::warn!("inbound object has no `method`; dropping");
            }
            Some(InboundMessage::Notification { method, raw }) => {
                self.handle_notification(method, raw).await;
            }
            Some(InboundMessage::Request { id, method, raw }) => {
                self.handle_request(id, method, raw).await;
            }
        }
    }

    async fn handle_notification(self: Arc<Self>, method: String, raw: Value) {
        if method == METHOD_INITIALIZED_NOTIFICATION {
            self.session.mark_initialized().await;
        }
        let headers = self.session.headers().await;
        tokio::spawn(async move {
            let _ = self.http.post(&raw, &headers).await;
        });
    }

    async fn handle_request(self: Arc<Self>, id: Value, method: String, raw: Value) {
        if method == METHOD_INITIALIZE {
            self.session
                .capture_init_params(raw.get("params").cloned())
                .await;
        }

        let method_static = cacheable_static(&method);
        let delivery = self.execute_with_retries(&raw, &id, &method, method_static).await;

        match delivery {
            Delivery::Success => {
                self.on_upstream_success(&method).await;
            }
            Delivery::SseUnmatched => {}
            Delivery::Exhausted(reason) => {
                self.on_retries_exhausted(&id, &method, &reason).await;
            }
        }
    }

    /// Attempt up to `MAX_RETRIES + 1` times; handles stale-session
    /// re-mint, retryable-status backoff, and transient transport errors.
    async fn execute_with_retries(
        &self,
        message: &Value,
        target_id: &Value,
        method: &str,
        method_static: Option<&'static str>,
    ) -> Delivery {
        let mut attempt: u32 = 0;
        let mut stale_reinit_used = false;

        loop {
            attempt += 1;
            let headers = self.session.headers().await;

            match self.http.post(message, &headers).await {
                Err(err) => {
                    if self.session.session_id().await.is_some() {
                        self.session.clear_session().await;
                    }
                    if retry::is_transient(&err) && attempt <= retry::MAX_RETRIES {
                        tokio::time::sleep(retry::backoff_delay(attempt)).await;
                        continue;
                    }
                    return Delivery::Exhausted(
                        crate::error::ProxyError::Transport(err.to_string()).to_string(),
                    );
                }
                Ok(post) => {
                    self.session.capture_session_id(post.session_id.clone()).await;

                    if post.status.is_success() {
                        return self.deliver_success(post.body, target_id, method_static).await;
                    }

                    match retry::classify_status(post.status) {
                        ErrorClass::StaleSession => {
                            if stale_reinit_used {
                                return Delivery::Exhausted(format!(
                                    "{}: HTTP {} persisted after re-mint",
                                    crate::error::ProxyError::SessionExpired,
                                    post.status
                                ));
                            }
                            stale_reinit_used = true;
                            if let Err(e) = self.session.reinit(&self.http, &self.cache).await {
                                return Delivery::Exhausted(format!("re-mint failed: {e}"));
                            }
                            continue;
                        }
                        ErrorClass::Retryable => {
                            if attempt <= retry::MAX_RETRIES {
                                tokio::time::sleep(retry::backoff_delay(attempt)).await;
                                continue;
                            }
                            return Delivery::Exhausted(format!("HTTP {}", post.status));
                        }
                        ErrorClass::NonRetryable => {
                            return Delivery::Exhausted(format!("HTTP {}", post.status));
                        }
                    }
                }
            }
        }
    }

    async fn deliver_success(
        &self,
        body: Body,
        target_id: &Value,
        method_static: Option<&'static str>,
    ) -> Delivery {
        match body {
            Body::Json(mut value) => {
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("id".to_string(), target_id.clone());
                }
                if let Some(method) = method_static {
                    if let Ok(response) =
                        serde_json::from_value::<JsonRpcResponse>(value.clone())
                    {
                        self.cache.put(method, &response).await;
                    }
                }
                let _ = self.out.write_message(&value).await;
                Delivery::Success
            }
            Body::Sse(stream) => {
                let method = method_static.unwrap_or("");
                match sse::drain(stream, target_id, method, &self.cache, &self.out).await {
                    Ok(true) => Delivery::Success,
                    Ok(false) => Delivery::SseUnmatched,
                    Err(e) => Delivery::Exhausted(format!("SSE read failed: {e}")),
                }
            }
        }
    }

    /// Any successful upstream response flips `DOWN -> HEALTHY`, stops the
    /// prober, and (unless the request itself was `tools/list`) announces
    /// the recovery so the local peer refreshes its tool list.
    async fn on_upstream_success(self: &Arc<Self>, method: &str) {
        let was_down = self.health.mark_healthy().await;
        if was_down {
            self.health.abort_prober().await;
            if method != METHOD_TOOLS_LIST {
                let notif = serde_json::json!({"jsonrpc": "2.0", "method": NOTIF_TOOLS_LIST_CHANGED});
                let _ = self.out.write_message(&notif).await;
            }
        }
    }

    /// Retries exhausted: mark the API down (clearing the session and
    /// starting the prober on the healthy->down transition), then emit the
    /// appropriate fallback for this method.
    async fn on_retries_exhausted(self: &Arc<Self>, id: &Value, method: &str, reason: &str) {
        let became_down = self.health.mark_down().await;
        if became_down {
            self.session.clear_session().await;
            self.start_prober().await;
        }

        if method == METHOD_TOOLS_LIST {
            let response = match self.cache.get(METHOD_TOOLS_LIST).await {
                Some(cached) => cached.rekeyed(id.clone()),
                None => JsonRpcResponse::success(id.clone(), serde_json::json!({"tools": []})),
            };
            let _ = self.out.write_message(&serde_json::to_value(&response).unwrap()).await;
        } else if method == METHOD_INITIALIZE {
            let response = match self.cache.get(METHOD_INITIALIZE).await {
                Some(cached) => cached.rekeyed(id.clone()),
                None => JsonRpcResponse::synthesized_error(
                    id.clone(),
                    crate::error::ProxyError::ApiUnavailable(reason.to_string()).to_string(),
                ),
            };
            let _ = self.out.write_message(&serde_json::to_value(&response).unwrap()).await;
        } else {
            let response = JsonRpcResponse::synthesized_error(
                id.clone(),
                crate::error::ProxyError::ApiUnavailable(reason.to_string()).to_string(),
            );
            let _ = self.out.write_message(&serde_json::to_value(&response).unwrap()).await;
        }
    }

    /// Start the health prober task. Only called on a fresh
    /// `healthy -> down` transition, so "at most one prober" holds as long
    /// as `Health::mark_down` only reports `true` once per transition.
    async fn start_prober(self: &Arc<Self>) {
        self.start_prober_with_interval(HEALTH_CHECK_INTERVAL_MS).await;
    }

    /// Same as [`Self::start_prober`] but with an injectable tick interval,
    /// so tests can exercise a full down -> probe -> recovery cycle without
    /// waiting out the real `HEALTH_CHECK_INTERVAL_MS`.
    async fn start_prober_with_interval(self: &Arc<Self>, interval_ms: u64) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_millis(interval_ms));
            interval.tick().await; // first tick fires immediately; skip it
            loop {
                interval.tick().await;
                match this.session.reinit(&this.http, &this.cache).await {
                    Ok(()) => {
                        let was_down = this.health.mark_healthy().await;
                        this.health.clear_prober_slot().await;
                        if was_down {
                            let notif = serde_json::json!({
                                "jsonrpc": "2.0",
                                "method": NOTIF_TOOLS_LIST_CHANGED,
                            });
                            let _ = this.out.write_message(&notif).await;
                        }
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "health probe re-mint failed; will retry");
                    }
                }
            }
        });
        self.health.set_prober(handle).await;
    }
}

/// Returns the static method name if `method` is one of the cacheable
/// methods, so downstream code can key the cache without allocating.
fn cacheable_static(method: &str) -> Option<&'static str> {
    if method == METHOD_INITIALIZE {
        Some(METHOD_INITIALIZE)
    } else if method == METHOD_TOOLS_LIST {
        Some(METHOD_TOOLS_LIST)
    } else {
        None
    }
}
