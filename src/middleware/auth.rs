//! Bearer-token middleware for the protected route tree.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::policy::Role;
use crate::auth::token::{validate_token, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Verified caller identity, inserted as a request extension once the token
/// checks out. Handlers take tenancy from here, never from the request body.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub tenant_id: String,
    pub branch_ids: Vec<String>,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
            tenant_id: claims.tenant_id,
            branch_ids: claims.branch_ids,
        }
    }
}

/// Reject the request with 401 unless it carries a valid bearer token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthenticated("Missing or malformed Authorization header"))?;

    let claims = validate_token(&state.config.security, token)?;
    request.extensions_mut().insert(AuthContext::from(claims));

    Ok(next.run(request).await)
}
