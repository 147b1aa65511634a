//! # MCP Handler Module
//!
//! This module implements the Model Context Protocol (MCP) surface of the server.
//! It handles incoming MCP requests and dispatches tool calls to the RPC client.
//!
//! ## Supported Tools
//!
//! - `ethereum_request` - Make an Ethereum JSON-RPC call. Hex quantities in the result of
//!   well-known methods (blocks, transactions, receipts, balances, gas) come back as decimals.

use crate::{
    blockchain::error::ApiError,
    mcp::protocol::{error_codes, Request, Response},
    utils, AppState,
};
use serde_json::{json, Value};
use tracing::{error, info};

pub const TOOL_NAME: &str = "ethereum_request";

const SERVER_NAME: &str = "ethereum_rpc_mcp";
const PROTOCOL_VERSION: &str = "2025-06-18";

fn text_content(text: String) -> Value {
    json!([{ "type": "text", "text": text }])
}

// A tool result carrying the normalized RPC result as pretty-printed JSON text.
fn tool_success(result: &Value) -> Value {
    let text = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
    json!({ "content": text_content(text) })
}

// Errors from the RPC pipeline are tool results flagged with isError, not protocol faults.
fn tool_error(err: &ApiError) -> Value {
    json!({
        "content": text_content(format!("Error: {}", err.message)),
        "isError": true
    })
}

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "ping" => Response::success(req.id.clone(), json!({})),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        // Direct call from CLI clients, rewritten into tools/call
        TOOL_NAME => {
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": TOOL_NAME,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let req_id = &req.id;

    if !args.is_object() {
        return Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            "Tool arguments must be an object".into(),
        );
    }

    match tool_name {
        TOOL_NAME => {
            let res: Result<Response, Response> = (async {
                let method = utils::get_required_arg::<String>(args, "method", req_id)?;
                if method.trim().is_empty() {
                    return Err(Response::error(
                        req_id.clone(),
                        error_codes::INVALID_PARAMS,
                        "Argument 'method' must not be empty".into(),
                    ));
                }
                let params = utils::get_optional_arg::<Vec<Value>>(args, "params", req_id)?
                    .unwrap_or_default();

                let result = match state.rpc_client.call(&method, params).await {
                    Ok(value) => tool_success(&value),
                    Err(err) => {
                        error!("ethereum_request {} failed: {}", method, err);
                        tool_error(&err)
                    }
                };
                Ok(Response::success(req_id.clone(), result))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        _ => Response::error(
            req_id.clone(),
            error_codes::METHOD_NOT_FOUND,
            format!("Unknown tool: {}", tool_name),
        ),
    }
}

fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "Ethereum JSON-RPC gateway. Use ethereum_request to call any eth_* method; numeric hex fields are returned as decimals and balances as wei/ether pairs.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let tools = json!([
        {
            "name": TOOL_NAME,
            "description": "Make an Ethereum JSON-RPC call (e.g. eth_blockNumber, eth_getBalance, eth_getBlockByNumber, eth_getTransactionByHash, eth_getTransactionReceipt, eth_getLogs). Hex quantities are converted to decimal; balances and transaction values are returned as {wei, ether}.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "method": {"type": "string", "description": "The JSON-RPC method name, e.g. 'eth_getBalance'."},
                    "params": {
                        "type": "array",
                        "description": "Positional parameters for the method, e.g. [\"0x742d35Cc6634C0532925a3b844Bc454e4438f44e\", \"latest\"].",
                        "items": {}
                    }
                },
                "required": ["method"],
                "additionalProperties": false
            }
        }
    ]);
    Response::success(req.id.clone(), json!({ "tools": tools }))
}
