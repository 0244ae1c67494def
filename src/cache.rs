//! Tenant-scoped TTL cache for patient list queries.
//!
//! Keys always include the tenant id, so no entry can span tenants. Writes
//! evict the tenant's unfiltered key plus the written branch's key; other
//! branch-filtered keys for the tenant age out via TTL (accepted staleness).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::database::models::Patient;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    tenant_id: String,
    branch_id: Option<String>,
}

impl CacheKey {
    fn new(tenant_id: &str, branch_id: Option<&str>) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            branch_id: branch_id.map(str::to_string),
        }
    }
}

struct Entry {
    patients: Arc<Vec<Patient>>,
    expires_at: Instant,
}

pub struct PatientListCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, Entry>>,
}

impl PatientListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, tenant_id: &str, branch_id: Option<&str>) -> Option<Arc<Vec<Patient>>> {
        let key = CacheKey::new(tenant_id, branch_id);

        // Fast path: read lock
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.patients.clone());
                }
                Some(_) => {} // stale, purge below
                None => return None,
            }
        }

        // Purge the stale entry; re-check in case a writer replaced it
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(&key) {
            if entry.expires_at > Instant::now() {
                return Some(entry.patients.clone());
            }
            entries.remove(&key);
        }
        None
    }

    /// Last-writer-wins; racing populators are tolerated, TTL bounds staleness.
    pub async fn put(&self, tenant_id: &str, branch_id: Option<&str>, patients: Arc<Vec<Patient>>) {
        let key = CacheKey::new(tenant_id, branch_id);
        let entry = Entry {
            patients,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Evict the keys a patient write makes stale: the tenant's unfiltered
    /// list and, when the new patient carries a primary branch, that
    /// branch's filtered list.
    pub async fn invalidate_on_write(&self, tenant_id: &str, branch_id: Option<&str>) {
        let mut entries = self.entries.write().await;
        entries.remove(&CacheKey::new(tenant_id, None));
        if branch_id.is_some() {
            entries.remove(&CacheKey::new(tenant_id, branch_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(tenant_id: &str, phone: &str) -> Patient {
        Patient::new(tenant_id, "First", "Last", phone, None)
    }

    fn list(tenant_id: &str, phone: &str) -> Arc<Vec<Patient>> {
        Arc::new(vec![patient(tenant_id, phone)])
    }

    #[tokio::test]
    async fn get_returns_what_put_stored() {
        let cache = PatientListCache::new(Duration::from_secs(60));
        assert!(cache.get("t1", None).await.is_none());

        cache.put("t1", None, list("t1", "081")).await;
        let hit = cache.get("t1", None).await.unwrap();
        assert_eq!(hit[0].phone_number, "081");
    }

    #[tokio::test]
    async fn keys_never_cross_tenants() {
        let cache = PatientListCache::new(Duration::from_secs(60));
        cache.put("t1", None, list("t1", "081")).await;

        assert!(cache.get("t2", None).await.is_none());
        assert!(cache.get("t1", Some("b1")).await.is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = PatientListCache::new(Duration::from_millis(10));
        cache.put("t1", None, list("t1", "081")).await;
        assert!(cache.get("t1", None).await.is_some());

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(cache.get("t1", None).await.is_none());
    }

    #[tokio::test]
    async fn write_invalidates_all_key_and_matching_branch_key_only() {
        let cache = PatientListCache::new(Duration::from_secs(60));
        cache.put("t1", None, list("t1", "081")).await;
        cache.put("t1", Some("b1"), list("t1", "082")).await;
        cache.put("t1", Some("b2"), list("t1", "083")).await;
        cache.put("t2", None, list("t2", "084")).await;

        cache.invalidate_on_write("t1", Some("b1")).await;

        assert!(cache.get("t1", None).await.is_none());
        assert!(cache.get("t1", Some("b1")).await.is_none());
        // Deliberately left stale until TTL lapses
        assert!(cache.get("t1", Some("b2")).await.is_some());
        // Other tenants untouched
        assert!(cache.get("t2", None).await.is_some());
    }

    #[tokio::test]
    async fn branchless_write_evicts_only_the_all_key() {
        let cache = PatientListCache::new(Duration::from_secs(60));
        cache.put("t1", None, list("t1", "081")).await;
        cache.put("t1", Some("b1"), list("t1", "082")).await;

        cache.invalidate_on_write("t1", None).await;

        assert!(cache.get("t1", None).await.is_none());
        assert!(cache.get("t1", Some("b1")).await.is_some());
    }

    #[tokio::test]
    async fn put_overwrites_last_writer_wins() {
        let cache = PatientListCache::new(Duration::from_secs(60));
        cache.put("t1", None, list("t1", "081")).await;
        cache.put("t1", None, list("t1", "082")).await;

        let hit = cache.get("t1", None).await.unwrap();
        assert_eq!(hit[0].phone_number, "082");
    }
}
