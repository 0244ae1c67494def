//! SQLite repositories, used by the integration test suite.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::{Branch, Patient, Tenant, User, UserBranch};
use crate::database::{
    is_unique_violation, BranchRepository, PatientRepository, TenantRepository, UserRepository,
};
use crate::error::ApiError;

pub struct SqliteTenantRepo {
    pool: SqlitePool,
}

impl SqliteTenantRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for SqliteTenantRepo {
    async fn ping(&self) -> Result<(), ApiError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, tenant: &Tenant) -> Result<(), ApiError> {
        sqlx::query("INSERT INTO tenants (id, code, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(&tenant.id)
            .bind(&tenant.code)
            .bind(&tenant.name)
            .bind(tenant.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Tenant>, ApiError> {
        let tenants = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        Ok(tenants)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Tenant>, ApiError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, ApiError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }
}

pub struct SqliteBranchRepo {
    pool: SqlitePool,
}

impl SqliteBranchRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BranchRepository for SqliteBranchRepo {
    async fn create(&self, branch: &Branch) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO branches (id, tenant_id, name, address, phone_number, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&branch.id)
        .bind(&branch.tenant_id)
        .bind(&branch.name)
        .bind(&branch.address)
        .bind(&branch.phone_number)
        .bind(branch.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Branch>, ApiError> {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT * FROM branches WHERE tenant_id = ? ORDER BY name",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }

    async fn belongs_to_tenant(&self, branch_id: &str, tenant_id: &str) -> Result<bool, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM branches WHERE id = ? AND tenant_id = ?",
        )
        .bind(branch_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn create(&self, user: &User) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO users (id, tenant_id, username, password_hash, full_name, role, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.tenant_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::UsernameExists
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_in_tenant(
        &self,
        tenant_id: &str,
        username: &str,
    ) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE tenant_id = ? AND username = ?",
        )
        .bind(tenant_id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, ApiError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn set_role(&self, id: &str, role: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_tenant(&self, id: &str, tenant_id: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET tenant_id = ? WHERE id = ?")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_branch(&self, membership: &UserBranch) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT OR IGNORE INTO user_branches (id, user_id, branch_id) VALUES (?, ?, ?)",
        )
        .bind(&membership.id)
        .bind(&membership.user_id)
        .bind(&membership.branch_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn branches_of(&self, user_id: &str) -> Result<Vec<Branch>, ApiError> {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT b.* FROM branches b
             JOIN user_branches ub ON ub.branch_id = b.id
             WHERE ub.user_id = ?
             ORDER BY b.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }
}

pub struct SqlitePatientRepo {
    pool: SqlitePool,
}

impl SqlitePatientRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientRepository for SqlitePatientRepo {
    async fn create(&self, patient: &Patient) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO patients
               (id, tenant_id, first_name, last_name, phone_number, primary_branch_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&patient.id)
        .bind(&patient.tenant_id)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.phone_number)
        .bind(&patient.primary_branch_id)
        .bind(patient.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::DuplicatePatient
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &str,
        branch_id: Option<&str>,
    ) -> Result<Vec<Patient>, ApiError> {
        // The tenant predicate is applied unconditionally beneath any
        // caller-supplied filter.
        let patients = match branch_id {
            Some(branch_id) => {
                sqlx::query_as::<_, Patient>(
                    "SELECT * FROM patients
                     WHERE tenant_id = ? AND primary_branch_id = ?
                     ORDER BY created_at DESC",
                )
                .bind(tenant_id)
                .bind(branch_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Patient>(
                    "SELECT * FROM patients WHERE tenant_id = ? ORDER BY created_at DESC",
                )
                .bind(tenant_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(patients)
    }
}
