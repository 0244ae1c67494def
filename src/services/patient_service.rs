//! The patient registry: tenant-isolated create/list with a cache-consistent
//! read path. The caller's tenant id is threaded in explicitly on every call
//! and applied unconditionally beneath any user-supplied filter.

use std::sync::Arc;

use crate::cache::PatientListCache;
use crate::database::models::Patient;
use crate::database::{BranchRepository, PatientRepository};
use crate::error::ApiError;

pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub primary_branch_id: Option<String>,
}

pub struct PatientService {
    patients: Arc<dyn PatientRepository>,
    branches: Arc<dyn BranchRepository>,
    cache: Arc<PatientListCache>,
}

impl PatientService {
    pub fn new(
        patients: Arc<dyn PatientRepository>,
        branches: Arc<dyn BranchRepository>,
        cache: Arc<PatientListCache>,
    ) -> Self {
        Self {
            patients,
            branches,
            cache,
        }
    }

    /// Create a patient in the caller's tenant.
    ///
    /// A primary branch, if given, must belong to the same tenant. Duplicate
    /// (tenant, phone) pairs surface as `DuplicatePatient` from the store's
    /// constraint check, so racing creates yield exactly one success. The
    /// affected cache keys are evicted before returning.
    pub async fn create(&self, tenant_id: &str, new: NewPatient) -> Result<Patient, ApiError> {
        if let Some(branch_id) = &new.primary_branch_id {
            if !self.branches.belongs_to_tenant(branch_id, tenant_id).await? {
                return Err(ApiError::invalid_reference(
                    "Branch does not belong to your tenant",
                ));
            }
        }

        let patient = Patient::new(
            tenant_id,
            new.first_name,
            new.last_name,
            new.phone_number,
            new.primary_branch_id,
        );
        self.patients.create(&patient).await?;

        self.cache
            .invalidate_on_write(tenant_id, patient.primary_branch_id.as_deref())
            .await;

        Ok(patient)
    }

    /// List the caller's tenant's patients, newest first, optionally
    /// filtered by primary branch. Cache-first; a miss populates the cache.
    pub async fn list(
        &self,
        tenant_id: &str,
        branch_id: Option<&str>,
    ) -> Result<Arc<Vec<Patient>>, ApiError> {
        if let Some(cached) = self.cache.get(tenant_id, branch_id).await {
            return Ok(cached);
        }

        let patients = Arc::new(self.patients.list_by_tenant(tenant_id, branch_id).await?);
        self.cache.put(tenant_id, branch_id, patients.clone()).await;

        Ok(patients)
    }
}
