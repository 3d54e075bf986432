//! Response cache for `initialize` and `tools/list` (`spec.md` §4.F)
//!
//! Restricted to the two cacheable methods by keying on `&'static str`
//! drawn from [`crate::mcp::types::CACHEABLE_METHODS`] rather than an
//! arbitrary `String`, so the restricted key set is a type-level property
//! instead of a runtime convention.

use crate::mcp::types::JsonRpcResponse;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Memoizes the most recent successful response per cacheable method.
#[derive(Default)]
pub struct Cache {
    entries: RwLock<HashMap<&'static str, JsonRpcResponse>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the cached response for `method`, if any.
    pub async fn get(&self, method: &str) -> Option<JsonRpcResponse> {
        self.entries.read().await.get(method).cloned()
    }

    /// Overwrite the cache entry for `method` with `response`, but only if
    /// `response.result` is present. A failed upstream response never
    /// reaches this method and so can never evict a cached entry.
    pub async fn put(&self, method: &'static str, response: &JsonRpcResponse) {
        if response.result.is_none() {
            return;
        }
        self.entries
            .write()
            .await
            .insert(method, response.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = Cache::new();
        let resp = JsonRpcResponse::success(json!(1), json!({"tools": []}));
        cache.put("tools/list", &resp).await;
        let got = cache.get("tools/list").await.expect("cached");
        assert_eq!(got.result, resp.result);
    }

    #[tokio::test]
    async fn error_response_does_not_overwrite_cache() {
        let cache = Cache::new();
        let ok = JsonRpcResponse::success(json!(1), json!({"tools": [{"name": "search"}]}));
        cache.put("tools/list", &ok).await;

        let err = JsonRpcResponse::synthesized_error(json!(2), "boom");
        cache.put("tools/list", &err).await;

        let got = cache.get("tools/list").await.expect("still cached");
        assert_eq!(got.result, ok.result);
    }

    #[tokio::test]
    async fn unknown_method_is_absent() {
        let cache = Cache::new();
        assert!(cache.get("tools/call").await.is_none());
    }
}
