//! # API Module
//!
//! HTTP surface of the server, used when it is not running as a stdio MCP server.
//!
//! ## Available Endpoints
//!
//! - `GET /api/health` - Checks that the Ethereum node answers `eth_blockNumber`
//! - `POST /api/rpc` - MCP JSON-RPC requests over HTTP

pub mod health;
pub mod rpc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Builds the HTTP router with every route nested under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/rpc", post(rpc::rpc_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
