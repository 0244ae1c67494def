//! Postgres repositories, used by the production server.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::{Branch, Patient, Tenant, User, UserBranch};
use crate::database::{
    is_unique_violation, BranchRepository, PatientRepository, TenantRepository, UserRepository,
};
use crate::error::ApiError;

pub struct PostgresTenantRepo {
    pool: PgPool,
}

impl PostgresTenantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepo {
    async fn ping(&self) -> Result<(), ApiError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, tenant: &Tenant) -> Result<(), ApiError> {
        sqlx::query("INSERT INTO tenants (id, code, name, created_at) VALUES ($1, $2, $3, $4)")
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
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, ApiError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }
}

pub struct PostgresBranchRepo {
    pool: PgPool,
}

impl PostgresBranchRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BranchRepository for PostgresBranchRepo {
    async fn create(&self, branch: &Branch) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO branches (id, tenant_id, name, address, phone_number, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
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
            "SELECT * FROM branches WHERE tenant_id = $1 ORDER BY name",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }

    async fn belongs_to_tenant(&self, branch_id: &str, tenant_id: &str) -> Result<bool, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM branches WHERE id = $1 AND tenant_id = $2",
        )
        .bind(branch_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO users (id, tenant_id, username, password_hash, full_name, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
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
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
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
            "SELECT * FROM users WHERE tenant_id = $1 AND username = $2",
        )
        .bind(tenant_id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, ApiError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn set_role(&self, id: &str, role: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_tenant(&self, id: &str, tenant_id: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET tenant_id = $1 WHERE id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_branch(&self, membership: &UserBranch) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO user_branches (id, user_id, branch_id) VALUES ($1, $2, $3)
             ON CONFLICT (user_id, branch_id) DO NOTHING",
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
             WHERE ub.user_id = $1
             ORDER BY b.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }
}

pub struct PostgresPatientRepo {
    pool: PgPool,
}

impl PostgresPatientRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientRepository for PostgresPatientRepo {
    async fn create(&self, patient: &Patient) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO patients
               (id, tenant_id, first_name, last_name, phone_number, primary_branch_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
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
                     WHERE tenant_id = $1 AND primary_branch_id = $2
                     ORDER BY created_at DESC",
                )
                .bind(tenant_id)
                .bind(branch_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Patient>(
                    "SELECT * FROM patients WHERE tenant_id = $1 ORDER BY created_at DESC",
                )
                .bind(tenant_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(patients)
    }
}
