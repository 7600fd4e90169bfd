use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ai-stock-analyst",
        "version": "1.0.0",
        "environment": state.config.environment,
    }))
}
