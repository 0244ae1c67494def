use std::sync::Arc;
use std::time::Duration;

use crate::cache::PatientListCache;
use crate::config::AppConfig;
use crate::database::{
    BranchRepository, PatientRepository, TenantRepository, UserRepository,
};
use crate::services::{AuthService, PatientService};

/// Shared application state: configuration, the repository handles and the
/// services composed over them. Handlers only ever see this behind an `Arc`.
pub struct AppState {
    pub config: AppConfig,
    pub tenants: Arc<dyn TenantRepository>,
    pub auth: AuthService,
    pub patients: PatientService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        tenants: Arc<dyn TenantRepository>,
        branches: Arc<dyn BranchRepository>,
        users: Arc<dyn UserRepository>,
        patients: Arc<dyn PatientRepository>,
    ) -> Self {
        let cache = Arc::new(PatientListCache::new(Duration::from_secs(
            config.cache.patient_list_ttl_secs,
        )));

        let auth = AuthService::new(
            tenants.clone(),
            branches.clone(),
            users,
            config.security.clone(),
        );
        let patient_service = PatientService::new(patients, branches, cache);

        Self {
            config,
            tenants,
            auth,
            patients: patient_service,
        }
    }
}
