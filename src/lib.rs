// src/lib.rs

use std::sync::Arc;

// Re-export modules
pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Client for the configured Ethereum node
    pub rpc_client: Arc<blockchain::client::EthereumRpcClient>,
}

impl AppState {
    pub fn new(config: config::Config) -> anyhow::Result<Self> {
        let rpc_client = blockchain::client::EthereumRpcClient::new(&config)?;
        Ok(Self {
            config,
            rpc_client: Arc::new(rpc_client),
        })
    }
}
