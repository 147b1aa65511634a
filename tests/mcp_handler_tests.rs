//! Tests for the MCP tool surface and the HTTP router

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request as HttpRequest, StatusCode},
};
use mockito::Matcher;
use serde_json::{json, Value};
use tower::ServiceExt;

use ethereum_rpc_mcp::{
    api::create_router,
    config::Config,
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    AppState,
};

fn create_test_state(server: &mockito::ServerGuard) -> AppState {
    let mut config = Config::new("test-key");
    config.base_url = server.url();
    AppState::new(config).expect("state should build")
}

fn tool_call(id: u64, arguments: Value) -> Request {
    Request {
        jsonrpc: "2.0".to_string(),
        id: json!(id),
        method: "tools/call".to_string(),
        params: Some(json!({ "name": "ethereum_request", "arguments": arguments })),
    }
}

async fn call(state: &AppState, req: Request) -> Response {
    handle_mcp_request(req, state.clone())
        .await
        .expect("request with an id should get a response")
}

fn content_text(response: &Response) -> String {
    response.result.as_ref().unwrap()["content"][0]["text"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_initialize_and_tools_list() {
    let server = mockito::Server::new_async().await;
    let state = create_test_state(&server);

    let init = call(
        &state,
        Request {
            jsonrpc: "2.0".into(),
            id: json!(1),
            method: "initialize".into(),
            params: Some(json!({})),
        },
    )
    .await;
    let result = init.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], json!("ethereum_rpc_mcp"));
    assert_eq!(result["capabilities"]["tools"]["listChanged"], json!(false));

    let list = call(
        &state,
        Request {
            jsonrpc: "2.0".into(),
            id: json!(2),
            method: "tools/list".into(),
            params: None,
        },
    )
    .await;
    let tools = list.result.unwrap()["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], json!("ethereum_request"));
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["method"]));
}

#[tokio::test]
async fn test_successful_call_returns_normalized_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/test-key")
        .match_body(Matcher::PartialJson(json!({"method": "eth_getBlockByNumber"})))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "number": "0xa",
                    "gasLimit": "0x1234",
                    "gasUsed": "0x1000",
                    "timestamp": "0x60ad0d60",
                    "transactions": []
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let state = create_test_state(&server);

    let response = call(
        &state,
        tool_call(3, json!({"method": "eth_getBlockByNumber", "params": ["latest", false]})),
    )
    .await;

    assert!(response.error.is_none());
    assert!(response.result.as_ref().unwrap().get("isError").is_none());
    let block: Value = serde_json::from_str(&content_text(&response)).unwrap();
    assert_eq!(
        block,
        json!({"number": 10, "gasLimit": 4660, "gasUsed": 4096, "timestamp": 1621953888, "transactions": []})
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_validation_error_is_a_tool_error_result() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let state = create_test_state(&server);

    let response = call(
        &state,
        tool_call(4, json!({"method": "eth_getBalance", "params": ["invalid-address", "latest"]})),
    )
    .await;

    assert!(response.error.is_none());
    assert_eq!(response.result.as_ref().unwrap()["isError"], json!(true));
    assert!(content_text(&response).starts_with("Error: Invalid address parameter"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_node_error_is_a_tool_error_result() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/test-key")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"nonce too low"}}"#)
        .create_async()
        .await;
    let state = create_test_state(&server);

    let response = call(
        &state,
        tool_call(5, json!({"method": "eth_sendRawTransaction", "params": ["0x02f8"]})),
    )
    .await;

    assert_eq!(response.result.as_ref().unwrap()["isError"], json!(true));
    assert_eq!(content_text(&response), "Error: nonce too low");
}

#[tokio::test]
async fn test_bad_tool_arguments_are_protocol_errors() {
    let server = mockito::Server::new_async().await;
    let state = create_test_state(&server);

    for arguments in [
        json!({}),
        json!({"method": 42}),
        json!({"method": ""}),
        json!({"method": "eth_blockNumber", "params": "0x1"}),
        json!("eth_blockNumber"),
    ] {
        let response = call(&state, tool_call(6, arguments.clone())).await;
        let error = response
            .error
            .unwrap_or_else(|| panic!("expected an error for {}", arguments));
        assert_eq!(error.code, error_codes::INVALID_PARAMS);
    }
}

#[tokio::test]
async fn test_unknown_tool_and_method() {
    let server = mockito::Server::new_async().await;
    let state = create_test_state(&server);

    let mut req = tool_call(7, json!({}));
    req.params = Some(json!({"name": "transfer_everything", "arguments": {}}));
    let response = call(&state, req).await;
    assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

    let response = call(
        &state,
        Request {
            jsonrpc: "2.0".into(),
            id: json!(8),
            method: "resources/list".into(),
            params: None,
        },
    )
    .await;
    assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let server = mockito::Server::new_async().await;
    let state = create_test_state(&server);

    let response = handle_mcp_request(
        Request {
            jsonrpc: "2.0".into(),
            id: Value::Null,
            method: "notifications/initialized".into(),
            params: None,
        },
        state,
    )
    .await;
    assert!(response.is_none());
}

#[tokio::test]
async fn test_direct_tool_alias() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/test-key")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x5208"}"#)
        .create_async()
        .await;
    let state = create_test_state(&server);

    let response = call(
        &state,
        Request {
            jsonrpc: "2.0".into(),
            id: json!(9),
            method: "ethereum_request".into(),
            params: Some(json!({"method": "eth_estimateGas", "params": [{"to": "0x0"}]})),
        },
    )
    .await;
    assert_eq!(content_text(&response), "21000");
}

#[tokio::test]
async fn test_http_health_endpoint() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/test-key")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#)
        .create_async()
        .await;
    let app = create_router(create_test_state(&server));

    let response = app
        .oneshot(
            HttpRequest::builder()
                .method(Method::GET)
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], json!("ok"));
}

#[tokio::test]
async fn test_http_rpc_endpoint() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/test-key")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0xa"}"#)
        .create_async()
        .await;
    let app = create_router(create_test_state(&server));

    let response = app
        .clone()
        .oneshot(
            HttpRequest::builder()
                .method(Method::POST)
                .uri("/api/rpc")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&tool_call(10, json!({"method": "eth_blockNumber"})))
                        .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let rpc: Response = serde_json::from_slice(&body).unwrap();
    assert_eq!(rpc.id, json!(10));
    assert_eq!(content_text(&rpc), "10");

    // notifications have nothing to answer over HTTP
    let response = app
        .oneshot(
            HttpRequest::builder()
                .method(Method::POST)
                .uri("/api/rpc")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let rpc: Response = serde_json::from_slice(&body).unwrap();
    assert_eq!(rpc.error.unwrap().code, error_codes::INVALID_REQUEST);
}
