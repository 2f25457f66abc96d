//! End-to-end dispatch behavior over a realistic service registry.

use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Value, json};

use corella_json_rpc_server::schema::{MethodDescriptor, ParamDescriptor, StructDescriptor};
use corella_json_rpc_server::{Dispatcher, InvokeError, ServiceRegistry};

fn registry() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();

    registry.register_struct(
        StructDescriptor::new("Address")
            .with_field(ParamDescriptor::new("city", "string").required())
            .with_field(ParamDescriptor::new("zip", "string")),
    );
    registry.register_struct(
        StructDescriptor::new("Person")
            .with_field(ParamDescriptor::new("name", "string").required())
            .with_field(ParamDescriptor::new("age", "int").with_default(json!(0)))
            .with_field(ParamDescriptor::new("address", "Address")),
    );

    registry.register_fn(
        "echo",
        MethodDescriptor::new()
            .with_param(ParamDescriptor::new("text", "string").required())
            .with_returns(ParamDescriptor::new("result", "string")),
        |mut args| async move { Ok(args.remove(0)) }.boxed(),
    );

    registry.register_fn(
        "noop",
        MethodDescriptor::new(),
        |_args| async move { Ok(Value::Null) }.boxed(),
    );

    registry.register_fn(
        "sum",
        MethodDescriptor::new()
            .with_param(ParamDescriptor::new("values", "int[]").required())
            .with_returns(ParamDescriptor::new("result", "int")),
        |args| {
            async move {
                let total: i64 = args[0]
                    .as_array()
                    .map(|items| items.iter().filter_map(Value::as_i64).sum())
                    .unwrap_or(0);
                Ok(json!(total))
            }
            .boxed()
        },
    );

    registry.register_fn(
        "transfer",
        MethodDescriptor::new()
            .with_param(ParamDescriptor::new("from", "string"))
            .with_param(ParamDescriptor::new("to", "string"))
            .with_param(ParamDescriptor::new("amount", "int")),
        |_args| async move { Ok(json!(true)) }.boxed(),
    );

    registry.register_fn(
        "pick",
        MethodDescriptor::new().with_param(
            ParamDescriptor::new("mode", "string")
                .required()
                .with_restrictions(vec![json!("a"), json!("b")]),
        ),
        |args| async move { Ok(args[0].clone()) }.boxed(),
    );

    registry.register_fn(
        "register",
        MethodDescriptor::new()
            .with_param(ParamDescriptor::new("person", "Person").required())
            .with_returns(ParamDescriptor::new("result", "Person")),
        |mut args| async move { Ok(args.remove(0)) }.boxed(),
    );

    registry.register_fn(
        "count",
        MethodDescriptor::new().with_returns(ParamDescriptor::new("result", "int")),
        |_args| async move { Ok(json!("3")) }.boxed(),
    );

    registry.register_fn(
        "reject",
        MethodDescriptor::new(),
        |_args| {
            async move {
                Err(InvokeError::application(
                    -32001,
                    "quota exceeded",
                    Some(json!({"limit": 10})),
                ))
            }
            .boxed()
        },
    );

    registry
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(registry()))
}

#[tokio::test]
async fn echo_round_trip() {
    let body = json!({"jsonrpc": "2.0", "method": "echo", "params": {"text": "hi"}, "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(response, json!({"jsonrpc": "2.0", "id": 1, "result": "hi"}));
}

#[tokio::test]
async fn response_id_echoes_request_id() {
    let body = json!({"jsonrpc": "2.0", "method": "noop", "id": "req-77"});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(response["id"], "req-77");
}

#[tokio::test]
async fn void_method_answers_success_payload() {
    let body = json!({"jsonrpc": "2.0", "method": "noop", "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(response["result"], json!({"success": true}));
}

#[tokio::test]
async fn void_payload_is_configurable() {
    let custom = Dispatcher::builder(Arc::new(registry()))
        .void_result(Value::Null)
        .build();
    let body = json!({"jsonrpc": "2.0", "method": "noop", "id": 1});
    let response = custom.dispatch(Some(body), None).await.unwrap();
    assert_eq!(response["result"], Value::Null);
}

#[tokio::test]
async fn malformed_body_yields_parse_error_even_without_id() {
    let response = dispatcher().dispatch(None, None).await.unwrap();
    assert_eq!(response["error"]["code"], -32700);
    assert!(response["id"].is_null());
}

#[tokio::test]
async fn empty_batch_is_a_single_invalid_request_response() {
    let response = dispatcher().dispatch(Some(json!([])), None).await.unwrap();
    assert!(!response.is_array());
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn notifications_are_suppressed_after_the_envelope_stage() {
    let engine = dispatcher();

    // success, application error, method not found, invalid params: silence
    for body in [
        json!({"jsonrpc": "2.0", "method": "noop"}),
        json!({"jsonrpc": "2.0", "method": "reject"}),
        json!({"jsonrpc": "2.0", "method": "no-such-method"}),
        json!({"jsonrpc": "2.0", "method": "echo", "params": {}}),
    ] {
        assert_eq!(engine.dispatch(Some(body), None).await, None);
    }

    // an envelope-level defect answers even a would-be notification
    let response = engine
        .dispatch(Some(json!({"jsonrpc": "1.0", "method": "noop"})), None)
        .await
        .unwrap();
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn batch_preserves_envelope_order_and_drops_notifications() {
    let body = json!([
        {"jsonrpc": "2.0", "method": "echo", "params": {"text": "first"}, "id": 1},
        {"jsonrpc": "2.0", "method": "noop"},
        {"jsonrpc": "2.0", "method": "sum", "params": {"values": [1, 2]}, "id": 2},
        {"jsonrpc": "2.0", "method": "no-such-method", "id": 3},
    ]);
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    let responses = response.as_array().unwrap();

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"], "first");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"], 3);
    assert_eq!(responses[2]["id"], 3);
    assert_eq!(responses[2]["error"]["code"], -32601);
}

#[tokio::test]
async fn noop_batch_with_notification_yields_one_element_array() {
    let body = json!([
        {"jsonrpc": "2.0", "method": "noop", "id": 1},
        {"jsonrpc": "2.0", "method": "noop"},
    ]);
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(response.as_array().unwrap().len(), 1);
    assert_eq!(response[0]["id"], 1);
}

#[tokio::test]
async fn all_notification_batch_yields_no_body() {
    let body = json!([
        {"jsonrpc": "2.0", "method": "noop"},
        {"jsonrpc": "2.0", "method": "noop"},
    ]);
    assert_eq!(dispatcher().dispatch(Some(body), None).await, None);
}

#[tokio::test]
async fn malformed_batch_elements_still_answer() {
    let body = json!([
        42,
        {"jsonrpc": "2.0", "method": "noop", "id": 1},
    ]);
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    let responses = response.as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32600);
    assert!(responses[0]["id"].is_null());
    assert_eq!(responses[1]["id"], 1);
}

#[tokio::test]
async fn missing_parameters_are_reported_together() {
    let body = json!({"jsonrpc": "2.0", "method": "transfer", "params": {"from": "alice"}, "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();

    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["data"]["missing"], json!(["to", "amount"]));
}

#[tokio::test]
async fn enumerated_restriction_failure_carries_the_declared_set() {
    let body = json!({"jsonrpc": "2.0", "method": "pick", "params": {"mode": "c"}, "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();

    assert_eq!(response["error"]["code"], -32602);
    let data = &response["error"]["data"];
    assert_eq!(data["cause"], "mode");
    assert_eq!(data["value"], "c");
    assert_eq!(data["restriction"], json!(["a", "b"]));
}

#[tokio::test]
async fn scalar_auto_wraps_into_declared_list() {
    let body = json!({"jsonrpc": "2.0", "method": "sum", "params": {"values": "5"}, "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(response["result"], 5);
}

#[tokio::test]
async fn array_for_scalar_parameter_is_invalid_params() {
    let body = json!({"jsonrpc": "2.0", "method": "echo", "params": {"text": ["hi"]}, "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn positional_params_bind_in_declared_order() {
    let body = json!({"jsonrpc": "2.0", "method": "transfer", "params": ["alice", "bob", "10"], "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(response["result"], true);
}

#[tokio::test]
async fn structured_parameters_coerce_recursively() {
    let body = json!({
        "jsonrpc": "2.0",
        "method": "register",
        "params": {"person": {"name": 42, "address": {"city": "Perth", "zip": 6000}}},
        "id": 1
    });
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(
        response["result"],
        json!({"name": "42", "age": 0, "address": {"city": "Perth", "zip": "6000"}})
    );
}

#[tokio::test]
async fn application_errors_pass_through_unchanged() {
    let body = json!({"jsonrpc": "2.0", "method": "reject", "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();

    assert_eq!(response["error"]["code"], -32001);
    assert_eq!(response["error"]["message"], "quota exceeded");
    assert_eq!(response["error"]["data"], json!({"limit": 10}));
}

#[tokio::test]
async fn method_hint_addresses_the_method_from_the_path() {
    let engine = dispatcher();

    let body = json!({"jsonrpc": "2.0", "params": {"text": "hi"}, "id": 1});
    let response = engine.dispatch(Some(body), Some("echo")).await.unwrap();
    assert_eq!(response["result"], "hi");

    let mismatched = json!({"jsonrpc": "2.0", "method": "noop", "id": 1});
    let response = engine.dispatch(Some(mismatched), Some("echo")).await.unwrap();
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn results_are_coerced_against_the_return_descriptor() {
    let body = json!({"jsonrpc": "2.0", "method": "count", "id": 1});
    let response = dispatcher().dispatch(Some(body), None).await.unwrap();
    assert_eq!(response["result"], 3);
}

#[tokio::test]
async fn result_validation_can_be_disabled() {
    let lax = Dispatcher::builder(Arc::new(registry()))
        .validate_results(false)
        .build();
    let body = json!({"jsonrpc": "2.0", "method": "count", "id": 1});
    let response = lax.dispatch(Some(body), None).await.unwrap();
    assert_eq!(response["result"], "3");
}
