use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and which optional models are loaded.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api",
        "models": {
            "entity_recognizer": state.parser.has_entity_recognizer(),
            "role_classifier": state.parser.has_role_model()
        }
    }))
}
