use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

// Reports whether the Ethereum node answers eth_blockNumber.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.rpc_client.test_connection().await {
        (StatusCode::OK, Json(serde_json::json!({"status": "ok", "node": "reachable"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "degraded", "node": "unreachable"})),
        )
    }
}
