//! # Health Check Handler
//!
//! Liveness plus a store probe, for load balancers and monitoring.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

/// Health check endpoint
///
/// ## Route
/// GET /health
///
/// ## Response
/// 200 with `"store": "ok"` when the database answers, otherwise 503 with
/// `"store": "unavailable"`. Ceremonies cannot run without the store, so a
/// failing probe takes the instance out of rotation.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let store_ok = sqlx::query("SELECT 1")
        .execute(state.store.pool())
        .await
        .map_err(|e| tracing::error!("Health probe failed: {:?}", e))
        .is_ok();

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if store_ok { "healthy" } else { "degraded" },
            "service": "passkey-ceremony-server",
            "partition": state.store.partition(),
            "store": if store_ok { "ok" } else { "unavailable" }
        })),
    )
}
