// src/blockchain/validator.rs

//! Pre-flight parameter checks.
//!
//! Only the methods the tool actively documents are checked here. Everything else goes to the
//! node untouched and the node decides whether the params make sense.

use serde_json::Value;

use super::error::ApiError;

fn is_hex_string(value: &Value) -> bool {
    value.as_str().map_or(false, |s| s.starts_with("0x"))
}

/// Rejects invocations whose params cannot be valid for `method`.
pub fn validate_params(method: &str, params: &[Value]) -> Result<(), ApiError> {
    match method {
        "eth_getBalance" => {
            if params.len() != 2 {
                return Err(ApiError::invalid_params(
                    "eth_getBalance requires 2 parameters: address and block parameter",
                ));
            }
            if !is_hex_string(&params[0]) {
                return Err(ApiError::invalid_params(
                    "Invalid address parameter: must be a 0x-prefixed hex string",
                ));
            }
        }
        "eth_getTransactionByHash" => {
            if params.len() != 1 {
                return Err(ApiError::invalid_params(
                    "eth_getTransactionByHash requires 1 parameter: transaction hash",
                ));
            }
            if !is_hex_string(&params[0]) {
                return Err(ApiError::invalid_params(
                    "Invalid transaction hash parameter: must be a 0x-prefixed hex string",
                ));
            }
        }
        "eth_getLogs" => {
            if params.len() != 1 {
                return Err(ApiError::invalid_params(
                    "eth_getLogs requires 1 parameter: filter object",
                ));
            }
            if !params[0].is_object() {
                return Err(ApiError::invalid_params(
                    "Invalid filter parameter: must be a filter object",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}
