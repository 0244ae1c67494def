//! Patient endpoints. The tenant always comes from the verified token, never
//! from the request.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::policy::{authorize, Action};
use crate::database::models::Patient;
use crate::error::ApiError;
use crate::middleware::AuthContext;
use crate::services::NewPatient;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub primary_branch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPatientsQuery {
    pub branch_id: Option<String>,
}

/// POST /patients - Admin and User roles only
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(ctx.role, Action::CreatePatient)?;

    let patient = state
        .patients
        .create(
            &ctx.tenant_id,
            NewPatient {
                first_name: body.first_name,
                last_name: body.last_name,
                phone_number: body.phone_number,
                primary_branch_id: body.primary_branch_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

/// GET /patients?branch_id=... - any authenticated role
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListPatientsQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    authorize(ctx.role, Action::ViewPatients)?;

    let patients = state
        .patients
        .list(&ctx.tenant_id, query.branch_id.as_deref())
        .await?;
    Ok(Json((*patients).clone()))
}
