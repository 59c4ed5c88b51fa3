use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use registry::AppRegistry;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "ts": Utc::now().to_rfc3339(),
    }))
}

pub async fn health_check_db(State(registry): State<AppRegistry>) -> StatusCode {
    if registry.health_check_repository().check_db().await {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
