use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::json;

use crate::app_state::AppState;

/// Defines health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(liveness_check))  // ✅ Liveness check
        .route("/health/ready", get(readiness_check)) // ✅ Readiness check
}

/// **Liveness Check (Basic Check)**
/// - ✅ Verifies that the API is running
/// - ❌ Does NOT touch review storage
async fn liveness_check() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "API is live" }))
}

/// **Readiness Check (Storage Connectivity Check)**
/// - ✅ Ensures the review store answers
/// - ❌ Returns `500` if it does not
async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state.reviews.ping().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "success": false, "error": "Review storage unavailable", "details": e.to_string() })
                .to_string(),
        )
    })?;

    Ok(Json(json!({ "success": true, "message": "API is ready" })))
}
