//! End-to-end resilience scenarios against a mock upstream
//!
//! Each test drives the whole coordinator (session + retry + cache +
//! health) through a concrete scenario from `spec.md` §8, using `wiremock`
//! the same way the teacher's own HTTP transport integration tests do.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vaiz_mcp_proxy::Config;
use vaiz_mcp_proxy::mcp::coordinator::Coordinator;
use vaiz_mcp_proxy::mcp::framer::OutputWriter;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        token: "secret".to_string(),
        space_id: None,
        api_url: server.uri(),
        debug: false,
    }
}

/// Scenario 1: happy JSON round trip populates the cache and preserves id.
#[tokio::test]
async fn happy_json_tools_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"jsonrpc":"2.0","id":1,"result":{"tools":[{"name":"search"}]}}),
        ))
        .mount(&server)
        .await;

    let (out, mut rx) = OutputWriter::for_test();
    let coordinator = Coordinator::new(&config_for(&server), Arc::new(out)).unwrap();

    Arc::clone(&coordinator)
        .handle_message(json!({"jsonrpc":"2.0","id":1,"method":"tools/list"}))
        .await;

    let emitted = rx.recv().await.unwrap();
    assert_eq!(
        emitted,
        json!({"jsonrpc":"2.0","id":1,"result":{"tools":[{"name":"search"}]}})
    );
}

/// Scenario 2: session id minted on the first response is carried on the
/// second outbound POST.
#[tokio::test]
async fn session_id_is_carried_on_subsequent_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("initialize"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Mcp-Session-Id", "abc")
                .set_body_json(json!({"jsonrpc":"2.0","id":1,"result":{}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("Mcp-Session-Id", "abc"))
        .and(wiremock::matchers::body_string_contains("tools/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"jsonrpc":"2.0","id":2,"result":{"tools":[]}}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (out, mut rx) = OutputWriter::for_test();
    let coordinator = Coordinator::new(&config_for(&server), Arc::new(out)).unwrap();

    Arc::clone(&coordinator)
        .handle_message(json!({"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}))
        .await;
    rx.recv().await.unwrap();

    Arc::clone(&coordinator)
        .handle_message(json!({"jsonrpc":"2.0","id":2,"method":"tools/list"}))
        .await;
    rx.recv().await.unwrap();

    server.verify().await;
}

/// Scenario 3: a stale session (400) triggers a re-mint, then the original
/// request succeeds; downstream sees exactly one response for it.
#[tokio::test]
async fn stale_session_triggers_remint_then_succeeds() {
    let server = MockServer::start().await;

    // tools/list: 400 once, then 200.
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("tools/list"))
        .respond_with(ResponseTemplate::new(400))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("tools/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"jsonrpc":"2.0","id":"42","result":{"tools":[]}}),
        ))
        .mount(&server)
        .await;
    // Re-mint (initialize) and the fire-and-forget initialized notification.
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("initialize"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Mcp-Session-Id", "fresh")
                .set_body_json(json!({"jsonrpc":"2.0","id":"_reinit_0","result":{}})),
        )
        .mount(&server)
        .await;

    let (out, mut rx) = OutputWriter::for_test();
    let coordinator = Coordinator::new(&config_for(&server), Arc::new(out)).unwrap();

    Arc::clone(&coordinator)
        .handle_message(json!({"jsonrpc":"2.0","id":"42","method":"tools/list"}))
        .await;

    let emitted = rx.recv().await.unwrap();
    assert_eq!(emitted["id"], json!("42"));
    assert_eq!(emitted["result"]["tools"], json!([]));
    assert!(rx.try_recv().is_err(), "exactly one response for the original request");
}

/// Scenario 4: after a successful `tools/list`, the upstream fails; a later
/// `tools/list` call is served from cache with the new request's id.
#[tokio::test]
async fn outage_serves_cached_tools_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("tools/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"jsonrpc":"2.0","id":1,"result":{"tools":[{"name":"search"}]}}),
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("tools/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("initialize"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (out, mut rx) = OutputWriter::for_test();
    let coordinator = Coordinator::new(&config_for(&server), Arc::new(out)).unwrap();

    Arc::clone(&coordinator)
        .handle_message(json!({"jsonrpc":"2.0","id":1,"method":"tools/list"}))
        .await;
    let first = rx.recv().await.unwrap();
    assert_eq!(first["result"]["tools"], json!([{"name": "search"}]));

    Arc::clone(&coordinator)
        .handle_message(json!({"jsonrpc":"2.0","id":"42","method":"tools/list"}))
        .await;
    let second = tokio::time::timeout(Duration::from_secs(15), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second["id"], json!("42"));
    assert_eq!(second["result"]["tools"], json!([{"name": "search"}]));
    assert!(second.get("error").is_none());
}

/// Scenario 5: same as scenario 4 but with no prior successful `tools/list`
/// -- the fallback is an empty tools array, never an error.
#[tokio::test]
async fn outage_without_cache_yields_empty_tools() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (out, mut rx) = OutputWriter::for_test();
    let coordinator = Coordinator::new(&config_for(&server), Arc::new(out)).unwrap();

    Arc::clone(&coordinator)
        .handle_message(json!({"jsonrpc":"2.0","id":"42","method":"tools/list"}))
        .await;

    let emitted = tokio::time::timeout(Duration::from_secs(15), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        emitted,
        json!({"jsonrpc":"2.0","id":"42","result":{"tools":[]}})
    );
}
