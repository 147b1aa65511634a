// src/blockchain/error.rs

use serde_json::{Map, Value};
use thiserror::Error;

use crate::mcp::protocol::{error_codes, ErrorObject};

const UNKNOWN_ERROR: &str = "Unknown error";

/// The single error type surfaced by the RPC pipeline.
///
/// Validation failures, transport failures and node-side JSON-RPC errors all end up here, so
/// callers only need to look at the message and, when they care, the optional code.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// HTTP status or JSON-RPC error code, when one is known.
    pub code: Option<i64>,
    pub details: Option<Map<String, Value>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                message
            },
            code: None,
            details: None,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }

    /// Parameter shape violation caught before any network I/O.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(message).with_code(error_codes::INVALID_PARAMS)
    }

    /// Failure that never produced a usable response (connect error, timeout, ...).
    ///
    /// The URL is stripped from the message since it carries the API key.
    pub fn transport(err: reqwest::Error) -> Self {
        let code = err.status().map(|s| s.as_u16() as i64);
        let err = err.without_url();
        let mut message = if err.is_timeout() {
            "Request timed out".to_string()
        } else {
            err.to_string()
        };
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        Self {
            code,
            ..Self::new(message)
        }
    }

    /// Wraps anything that is neither a validation nor a transport failure.
    pub fn unknown(err: impl std::fmt::Display) -> Self {
        Self::new(err.to_string())
    }

    /// Maps the `error` member of a JSON-RPC response.
    pub fn from_rpc_error(error: &ErrorObject) -> Self {
        let mut api_error = Self::new(error.message.clone()).with_code(error.code);
        if let Some(data) = &error.data {
            api_error = api_error.with_detail("data", data.clone());
        }
        api_error
    }

    /// Maps an HTTP error status, preferring whatever the body says about the failure.
    ///
    /// JSON-RPC bodies (`{"error": {"code", "message"}}`) win over a flat
    /// `{"code", "message"}` body, which wins over the bare status.
    pub fn from_http_status(status: reqwest::StatusCode, body: &str) -> Self {
        let fallback = format!("HTTP error {}", status);
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let source = parsed.as_ref().map(|v| match v.get("error") {
            Some(inner) if inner.is_object() => inner,
            _ => v,
        });

        let message = source
            .and_then(|s| s.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(fallback);
        let code = source
            .and_then(|s| s.get("code"))
            .and_then(Value::as_i64)
            .unwrap_or(status.as_u16() as i64);

        let mut api_error = Self::new(message).with_code(code);
        if let Some(body) = parsed {
            api_error = api_error.with_detail("response", body);
        }
        api_error
    }
}
