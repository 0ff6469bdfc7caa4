use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::warn;

use super::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, storage) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            warn!(error = %err, "storage ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = json!({
        "status": if status.is_success() { "healthy" } else { "unhealthy" },
        "service": "circuit-coach",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (status, Json(body))
}
