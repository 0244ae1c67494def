use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant-isolated patient record. Phone numbers are unique per tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: String,
    pub tenant_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub primary_branch_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(
        tenant_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
        primary_branch_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: phone_number.into(),
            primary_branch_id,
            created_at: Utc::now(),
        }
    }
}
