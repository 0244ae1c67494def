use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::policy::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    /// Globally unique, not per-tenant
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        tenant_id: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            full_name: full_name.into(),
            role: role.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Stored role string as a policy role. Rows are only ever written from
    /// `Role::as_str`, so an unparseable value is a data integrity fault.
    pub fn role(&self) -> Result<Role, crate::error::ApiError> {
        self.role.parse::<Role>().map_err(|_| {
            crate::error::ApiError::internal_server_error(format!(
                "user {} carries unknown role '{}'",
                self.id, self.role
            ))
        })
    }
}

/// Many-to-many membership between users and branches, unique per pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserBranch {
    pub id: String,
    pub user_id: String,
    pub branch_id: String,
}

impl UserBranch {
    pub fn new(user_id: impl Into<String>, branch_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            branch_id: branch_id.into(),
        }
    }
}
