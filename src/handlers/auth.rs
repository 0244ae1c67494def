//! Registration, login and user administration endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::policy::{authorize, Action};
use crate::database::models::{Branch, Tenant, User};
use crate::error::ApiError;
use crate::middleware::AuthContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub tenant_code: String,
    pub branch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub tenant_code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub branch_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignTenantRequest {
    pub tenant_id: String,
    pub branch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddBranchesRequest {
    pub branch_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TenantSummary {
    pub id: String,
    pub code: String,
    pub name: String,
}

impl From<Tenant> for TenantSummary {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            code: tenant.code,
            name: tenant.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BranchInfo {
    pub id: String,
    pub name: String,
}

impl From<Branch> for BranchInfo {
    fn from(branch: Branch) -> Self {
        Self {
            id: branch.id,
            name: branch.name,
        }
    }
}

/// User as returned by the admin endpoints. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub tenant_id: String,
    pub branches: Vec<BranchInfo>,
}

impl UserResponse {
    fn from_parts(user: User, branches: Vec<Branch>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            tenant_id: user.tenant_id,
            branches: branches.into_iter().map(BranchInfo::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub tenant_id: String,
    pub tenant_code: String,
    pub tenant_name: String,
    pub branches: Vec<BranchInfo>,
}

/// GET /auth/tenants - tenant directory for login/registration forms
pub async fn list_tenants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TenantSummary>>, ApiError> {
    let tenants = state.auth.list_tenants().await?;
    Ok(Json(tenants.into_iter().map(TenantSummary::from).collect()))
}

/// POST /auth/register - self-service signup, always as Viewer
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, branches) = state
        .auth
        .register(&body.username, &body.password, &body.tenant_code, body.branch_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_parts(user, branches)),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .auth
        .login(&body.username, &body.password, &body.tenant_code)
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        username: outcome.user.username,
        full_name: outcome.user.full_name,
        role: outcome.user.role,
        tenant_id: outcome.tenant.id,
        tenant_code: outcome.tenant.code,
        tenant_name: outcome.tenant.name,
        branches: outcome.branches.into_iter().map(BranchInfo::from).collect(),
    }))
}

/// POST /auth/users - admin creates a user in their own tenant
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(ctx.role, Action::ManageUsers)?;

    let (user, branches) = state
        .auth
        .create_user(
            &ctx.tenant_id,
            &body.username,
            &body.password,
            &body.full_name,
            &body.role,
            &body.branch_ids,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_parts(user, branches)),
    ))
}

/// PUT /auth/users/:id/role
pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<String>,
    Json(body): Json<AssignRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(ctx.role, Action::ManageUsers)?;

    let (user, branches) = state.auth.assign_role(&user_id, &body.role).await?;
    Ok(Json(UserResponse::from_parts(user, branches)))
}

/// PUT /auth/users/:id/tenant
pub async fn assign_tenant(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<String>,
    Json(body): Json<AssignTenantRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(ctx.role, Action::ManageUsers)?;

    let (user, branches) = state
        .auth
        .assign_tenant(&user_id, &body.tenant_id, body.branch_id)
        .await?;
    Ok(Json(UserResponse::from_parts(user, branches)))
}

/// POST /auth/users/:id/branches
pub async fn add_branches(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<String>,
    Json(body): Json<AddBranchesRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(ctx.role, Action::ManageUsers)?;

    let (user, branches) = state
        .auth
        .add_branches(&ctx.tenant_id, &user_id, &body.branch_ids)
        .await?;
    Ok(Json(UserResponse::from_parts(user, branches)))
}
