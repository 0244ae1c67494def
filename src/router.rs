use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the full route tree. Everything under the protected router requires
/// a valid bearer token; role checks happen per handler.
pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root_index))
        .route("/health", get(handlers::health))
        .route("/auth/tenants", get(handlers::auth::list_tenants))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .route("/auth/users", post(handlers::auth::create_user))
        .route("/auth/users/:id/role", put(handlers::auth::assign_role))
        .route("/auth/users/:id/tenant", put(handlers::auth::assign_tenant))
        .route("/auth/users/:id/branches", post(handlers::auth::add_branches))
        .route("/branches", get(handlers::branches::list_branches))
        .route(
            "/patients",
            post(handlers::patients::create_patient).get(handlers::patients::list_patients),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
