//! JSON-RPC client for the configured Ethereum node.
//!
//! Every call goes through the same pipeline: validate the params, send a single JSON-RPC
//! envelope, then normalize the result. There are no retries; a failed call fails the whole
//! operation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{error::ApiError, normalizer::normalize_response, validator::validate_params};
use crate::{
    config::Config,
    mcp::protocol::{Request, Response},
};

/// Hooks into the client's request lifecycle. The default implementation logs via `tracing`.
pub trait RpcObserver: Send + Sync {
    fn on_request(&self, _envelope: &Request) {}
    fn on_response(&self, _method: &str, _response: &Response) {}
    fn on_error(&self, _method: &str, _error: &ApiError) {}
}

#[derive(Debug, Default)]
pub struct TracingObserver;

impl RpcObserver for TracingObserver {
    fn on_request(&self, envelope: &Request) {
        let params = envelope.params.clone().unwrap_or_default();
        debug!(
            "RPC request id={} method={} params={}",
            envelope.id, envelope.method, params
        );
    }

    fn on_response(&self, method: &str, response: &Response) {
        match &response.error {
            Some(err) => warn!(
                "RPC {} answered with error {}: {}",
                method, err.code, err.message
            ),
            None => debug!("RPC response id={} method={}", response.id, method),
        }
    }

    fn on_error(&self, method: &str, error: &ApiError) {
        error!("RPC {} failed: {} (code: {:?})", method, error.message, error.code);
    }
}

/// Client for a single Ethereum JSON-RPC endpoint.
pub struct EthereumRpcClient {
    http: reqwest::Client,
    endpoint: String,
    /// Request ids, unique per client for its lifetime.
    next_id: AtomicU64,
    observer: Arc<dyn RpcObserver>,
}

impl EthereumRpcClient {
    /// Builds a client for `<base_url>/<api_key>`. Fails without an API key.
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(anyhow!("An API key is required to create the Ethereum RPC client"));
        }
        url::Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.base_url))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            next_id: AtomicU64::new(1),
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn RpcObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Sends one JSON-RPC envelope and returns the node's response as-is.
    ///
    /// Only transport and HTTP failures are errors here; a JSON-RPC `error` member in a 200
    /// response is returned to the caller inside the [`Response`].
    pub async fn request(&self, method: &str, params: Vec<Value>) -> Result<Response, ApiError> {
        let envelope = Request::envelope(self.next_id(), method, params);
        self.observer.on_request(&envelope);

        let result = self.send(&envelope).await;
        match &result {
            Ok(response) => self.observer.on_response(method, response),
            Err(err) => self.observer.on_error(method, err),
        }
        result
    }

    async fn send(&self, envelope: &Request) -> Result<Response, ApiError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(envelope)
            .send()
            .await
            .map_err(ApiError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;

        if !status.is_success() {
            return Err(ApiError::from_http_status(status, &body));
        }

        serde_json::from_str::<Response>(&body)
            .map_err(|e| ApiError::unknown(format!("Invalid JSON-RPC response: {}", e)))
    }

    /// Validates, sends and normalizes a call. Node-side JSON-RPC errors become [`ApiError`]s.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ApiError> {
        if let Err(err) = validate_params(method, &params) {
            self.observer.on_error(method, &err);
            return Err(err);
        }

        let response = self.request(method, params).await?;
        if let Some(rpc_error) = &response.error {
            return Err(ApiError::from_rpc_error(rpc_error));
        }

        Ok(normalize_response(
            method,
            response.result.unwrap_or(Value::Null),
        ))
    }

    /// Liveness check: a single `eth_blockNumber`. Error details are dropped.
    pub async fn test_connection(&self) -> bool {
        match self.request("eth_blockNumber", Vec::new()).await {
            Ok(response) => response.error.is_none(),
            Err(_) => false,
        }
    }
}
