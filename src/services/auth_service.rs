//! Registration, login and user administration.
//!
//! Tenancy is established here and nowhere later: login resolves the tenant
//! code, binds the tenant id into the token claims, and every downstream
//! handler trusts only those claims.

use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::policy::Role;
use crate::auth::token::{issue_token, Claims};
use crate::config::SecurityConfig;
use crate::database::models::{Branch, Tenant, User, UserBranch};
use crate::database::{BranchRepository, TenantRepository, UserRepository};
use crate::error::ApiError;

pub struct AuthService {
    tenants: Arc<dyn TenantRepository>,
    branches: Arc<dyn BranchRepository>,
    users: Arc<dyn UserRepository>,
    security: SecurityConfig,
}

/// Everything a successful login hands back to the client.
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
    pub tenant: Tenant,
    pub branches: Vec<Branch>,
}

impl AuthService {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        branches: Arc<dyn BranchRepository>,
        users: Arc<dyn UserRepository>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            tenants,
            branches,
            users,
            security,
        }
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, ApiError> {
        self.tenants.list().await
    }

    pub async fn list_branches(&self, tenant_id: &str) -> Result<Vec<Branch>, ApiError> {
        self.branches.list_by_tenant(tenant_id).await
    }

    /// Self-service signup into an existing tenant. New accounts always start
    /// as viewers; an admin promotes them later. The tenant code is matched
    /// case-insensitively (codes are stored upper-case).
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        tenant_code: &str,
        branch_id: Option<String>,
    ) -> Result<(User, Vec<Branch>), ApiError> {
        let tenant = self
            .tenants
            .find_by_code(&tenant_code.to_uppercase())
            .await?
            .ok_or(ApiError::InvalidTenant)?;

        if self.users.username_exists(username).await? {
            return Err(ApiError::UsernameExists);
        }

        if let Some(branch_id) = &branch_id {
            if !self.branches.belongs_to_tenant(branch_id, &tenant.id).await? {
                return Err(ApiError::invalid_reference(
                    "Branch does not belong to this tenant",
                ));
            }
        }

        let user = User::new(
            &tenant.id,
            username,
            hash_password(password, self.security.pbkdf2_iterations),
            username, // no display name at signup
            Role::Viewer,
        );
        self.users.create(&user).await?;

        if let Some(branch_id) = branch_id {
            self.users.add_branch(&UserBranch::new(&user.id, &branch_id)).await?;
        }

        let branches = self.users.branches_of(&user.id).await?;
        tracing::info!(username, tenant = %tenant.code, "registered new user");
        Ok((user, branches))
    }

    /// Authenticate within a tenant and issue a bearer token carrying the
    /// caller's role, tenant and branch set.
    ///
    /// Unknown tenant codes fail with 400 before any credential check;
    /// unknown usernames and wrong passwords collapse into the same 401.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        tenant_code: &str,
    ) -> Result<LoginOutcome, ApiError> {
        let tenant = self
            .tenants
            .find_by_code(&tenant_code.to_uppercase())
            .await?
            .ok_or(ApiError::InvalidTenant)?;

        let user = match self.users.find_in_tenant(&tenant.id, username).await? {
            Some(user)
                if verify_password(
                    password,
                    &user.password_hash,
                    self.security.pbkdf2_iterations,
                ) =>
            {
                user
            }
            _ => return Err(ApiError::InvalidCredentials),
        };

        let branches = self.users.branches_of(&user.id).await?;
        let branch_ids = branches.iter().map(|b| b.id.clone()).collect();

        let claims = Claims::new(
            &self.security,
            &user.id,
            &user.username,
            user.role()?,
            &tenant.id,
            branch_ids,
        );
        let token = issue_token(&self.security, &claims)?;

        tracing::info!(username, tenant = %tenant.code, "login succeeded");
        Ok(LoginOutcome {
            token,
            user,
            tenant,
            branches,
        })
    }

    /// Admin-created account in the caller's own tenant, with an explicit
    /// role and initial branch memberships.
    pub async fn create_user(
        &self,
        caller_tenant_id: &str,
        username: &str,
        password: &str,
        full_name: &str,
        role: &str,
        branch_ids: &[String],
    ) -> Result<(User, Vec<Branch>), ApiError> {
        let role: Role = role.parse()?;

        if self.users.username_exists(username).await? {
            return Err(ApiError::UsernameExists);
        }

        for branch_id in branch_ids {
            if !self
                .branches
                .belongs_to_tenant(branch_id, caller_tenant_id)
                .await?
            {
                return Err(ApiError::invalid_reference(
                    "Branch does not belong to your tenant",
                ));
            }
        }

        let user = User::new(
            caller_tenant_id,
            username,
            hash_password(password, self.security.pbkdf2_iterations),
            full_name,
            role,
        );
        self.users.create(&user).await?;

        for branch_id in branch_ids {
            self.users.add_branch(&UserBranch::new(&user.id, branch_id)).await?;
        }

        let branches = self.users.branches_of(&user.id).await?;
        Ok((user, branches))
    }

    pub async fn assign_role(
        &self,
        user_id: &str,
        role: &str,
    ) -> Result<(User, Vec<Branch>), ApiError> {
        let role: Role = role.parse()?;

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        self.users.set_role(user_id, role.as_str()).await?;
        user.role = role.as_str().to_string();

        let branches = self.users.branches_of(user_id).await?;
        Ok((user, branches))
    }

    /// Move a user to another tenant, optionally attaching a branch there.
    /// Branch memberships in the old tenant are left in place; tokens issued
    /// before the move keep their old tenant until they expire.
    pub async fn assign_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
        branch_id: Option<String>,
    ) -> Result<(User, Vec<Branch>), ApiError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| ApiError::bad_request("Tenant does not exist"))?;

        if let Some(branch_id) = &branch_id {
            if !self.branches.belongs_to_tenant(branch_id, &tenant.id).await? {
                return Err(ApiError::invalid_reference(
                    "Branch does not belong to the target tenant",
                ));
            }
        }

        self.users.set_tenant(user_id, &tenant.id).await?;
        user.tenant_id = tenant.id.clone();

        if let Some(branch_id) = branch_id {
            self.users.add_branch(&UserBranch::new(user_id, &branch_id)).await?;
        }

        let branches = self.users.branches_of(user_id).await?;
        Ok((user, branches))
    }

    /// Grant additional branch memberships. Restricted to users in the
    /// caller's own tenant; duplicates are ignored.
    pub async fn add_branches(
        &self,
        caller_tenant_id: &str,
        user_id: &str,
        branch_ids: &[String],
    ) -> Result<(User, Vec<Branch>), ApiError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if user.tenant_id != caller_tenant_id {
            return Err(ApiError::forbidden("User belongs to another tenant"));
        }

        for branch_id in branch_ids {
            if !self
                .branches
                .belongs_to_tenant(branch_id, caller_tenant_id)
                .await?
            {
                return Err(ApiError::invalid_reference(
                    "Branch does not belong to your tenant",
                ));
            }
        }

        for branch_id in branch_ids {
            self.users.add_branch(&UserBranch::new(user_id, branch_id)).await?;
        }

        let branches = self.users.branches_of(user_id).await?;
        Ok((user, branches))
    }
}
