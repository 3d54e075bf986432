//! JSON-RPC classification and cache-key integration tests
//!
//! Exercises the wire-primitive behavior from outside the crate, the same
//! black-box style the teacher uses for its own type round-trip tests.

use vaiz_mcp_proxy::mcp::types::{
    CACHEABLE_METHODS, InboundMessage, JsonRpcResponse, METHOD_INITIALIZE, METHOD_TOOLS_LIST,
};

#[test]
fn only_initialize_and_tools_list_are_cacheable() {
    assert_eq!(CACHEABLE_METHODS, &[METHOD_INITIALIZE, METHOD_TOOLS_LIST]);
    assert!(!CACHEABLE_METHODS.contains(&"tools/call"));
}

#[test]
fn classification_is_structural_not_method_based() {
    // A notification-shaped `initialize` (no id) still classifies as a
    // notification -- the id is the only thing that matters.
    let v = serde_json::json!({"jsonrpc":"2.0","method":"initialize","params":{}});
    match InboundMessage::classify(v).unwrap() {
        InboundMessage::Notification { method, .. } => assert_eq!(method, "initialize"),
        InboundMessage::Request { .. } => panic!("missing id must classify as notification"),
    }
}

#[test]
fn numeric_and_string_ids_both_survive_a_rekey() {
    let resp = JsonRpcResponse::success(serde_json::json!(7), serde_json::json!({"tools": []}));
    let rekeyed = resp.rekeyed(serde_json::json!("seven"));
    assert_eq!(rekeyed.id, serde_json::json!("seven"));
    assert_eq!(rekeyed.result, resp.result);
    assert!(rekeyed.error.is_none());
}

#[test]
fn synthesized_error_always_uses_the_reserved_code() {
    let resp = JsonRpcResponse::synthesized_error(serde_json::json!(1), "API unavailable: boom");
    let err = resp.error.expect("error present");
    assert_eq!(err.code, -32000);
    assert_eq!(err.message, "API unavailable: boom");
    assert!(resp.result.is_none());
}
