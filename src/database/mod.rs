pub mod models;
pub mod repos;
pub mod seed;

use async_trait::async_trait;

use crate::database::models::{Branch, Patient, Tenant, User, UserBranch};
use crate::error::ApiError;

/// Recognize a unique-constraint violation from the persistence layer.
///
/// Prefers the structured `ErrorKind` signal from sqlx; falls back to the
/// driver error codes (23505 for Postgres, 2067/1555 for SQLite). The code
/// check is a known fragility kept only for drivers that do not classify
/// the error kind.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };
    if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
        return true;
    }
    matches!(
        db_err.code().as_deref(),
        Some("23505") | Some("2067") | Some("1555")
    )
}

#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Liveness probe for the backing store
    async fn ping(&self) -> Result<(), ApiError>;
    async fn create(&self, tenant: &Tenant) -> Result<(), ApiError>;
    async fn list(&self) -> Result<Vec<Tenant>, ApiError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Tenant>, ApiError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, ApiError>;
}

#[async_trait]
pub trait BranchRepository: Send + Sync {
    async fn create(&self, branch: &Branch) -> Result<(), ApiError>;
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Branch>, ApiError>;
    async fn belongs_to_tenant(&self, branch_id: &str, tenant_id: &str) -> Result<bool, ApiError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a username collision surfaces as `UsernameExists`
    async fn create(&self, user: &User) -> Result<(), ApiError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError>;
    async fn find_in_tenant(&self, tenant_id: &str, username: &str)
        -> Result<Option<User>, ApiError>;
    async fn username_exists(&self, username: &str) -> Result<bool, ApiError>;
    async fn set_role(&self, id: &str, role: &str) -> Result<(), ApiError>;
    async fn set_tenant(&self, id: &str, tenant_id: &str) -> Result<(), ApiError>;
    /// Add a branch membership; inserting an existing pair is a no-op
    async fn add_branch(&self, membership: &UserBranch) -> Result<(), ApiError>;
    async fn branches_of(&self, user_id: &str) -> Result<Vec<Branch>, ApiError>;
}

#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Insert a patient; a (tenant, phone) collision surfaces as
    /// `DuplicatePatient`
    async fn create(&self, patient: &Patient) -> Result<(), ApiError>;
    /// Rows are always constrained to `tenant_id` beneath any filter and
    /// ordered by creation time descending
    async fn list_by_tenant(
        &self,
        tenant_id: &str,
        branch_id: Option<&str>,
    ) -> Result<Vec<Patient>, ApiError>;
}
