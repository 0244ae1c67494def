//! Branch directory for the caller's tenant.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::database::models::Branch;
use crate::error::ApiError;
use crate::middleware::AuthContext;
use crate::state::AppState;

/// GET /branches - branches of the caller's tenant, any authenticated role
pub async fn list_branches(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<Branch>>, ApiError> {
    let branches = state.auth.list_branches(&ctx.tenant_id).await?;
    Ok(Json(branches))
}
