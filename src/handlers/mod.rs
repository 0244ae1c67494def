pub mod auth;
pub mod branches;
pub mod patients;

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service banner
pub async fn root_index() -> Json<Value> {
    Json(json!({
        "name": "clinic-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - liveness plus a database round trip
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state.tenants.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
