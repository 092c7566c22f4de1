//! Job tracker: the jobId↔schedulerJobId mapping plus
//! analysis metadata and filtered listing.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::token::OwnerLookup;

/// The minimal capability the scheduler adapter needs:
/// record, read back and forget the jobId↔schedulerJobId mapping. The
/// SQL-backed [`JobTracker`] and the in-memory [`MemoryJobBackend`] (used
/// by tests and by deployments without the full store) both satisfy it.
pub trait JobTrackerBackend: Send + Sync {
    fn store_job_mapping(&self, job_id: &str, scheduler_job_id: &str) -> Result<()>;
    fn get_scheduler_job_id(&self, job_id: &str) -> Result<String>;
    fn delete_job_mapping(&self, job_id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct JobTracker {
    db: dm_store::Database,
}

impl JobTracker {
    pub fn new(db: dm_store::Database) -> Self {
        Self { db }
    }

    fn conn_err(e: impl std::fmt::Display) -> Error {
        Error::generic(e.to_string())
    }

    pub fn store_job_mapping(&self, job_id: &str, scheduler_job_id: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn)
            .store_job_mapping(job_id, scheduler_job_id, now)
            .map_err(Error::from_store)
    }

    pub fn store_job_with_user(
        &self,
        job_id: &str,
        scheduler_job_id: &str,
        user_id: Option<&str>,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn)
            .store_job_with_user(job_id, scheduler_job_id, user_id, now)
            .map_err(Error::from_store)
    }

    pub fn store_job_metadata(
        &self,
        job_id: &str,
        alignment_id: Option<&str>,
        tree_id: Option<&str>,
        method_type: &str,
        status: &str,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn)
            .store_job_metadata(job_id, alignment_id, tree_id, method_type, status, now)
            .map_err(Error::from_store)
    }

    pub fn get_scheduler_job_id(&self, job_id: &str) -> Result<String> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn).get_scheduler_job_id(job_id).map_err(Error::from_store)
    }

    pub fn get_scheduler_job_id_by_user(&self, job_id: &str, user_id: &str) -> Result<String> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn)
            .get_scheduler_job_id_by_user(job_id, user_id)
            .map_err(Error::from_store)
    }

    pub fn get_job_owner(&self, job_id: &str) -> Result<String> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn).get_job_owner(job_id).map_err(Error::from_store)
    }

    pub fn update_job_status(&self, job_id: &str, status: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn).update_job_status(job_id, status, now).map_err(Error::from_store)
    }

    pub fn update_job_status_by_user(&self, job_id: &str, user_id: &str, status: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn)
            .update_job_status_by_user(job_id, user_id, status, now)
            .map_err(Error::from_store)
    }

    pub fn delete_job_mapping(&self, job_id: &str) -> Result<()> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn).delete_job_mapping(job_id).map_err(Error::from_store)
    }

    pub fn delete_job_mapping_by_user(&self, job_id: &str, user_id: &str) -> Result<()> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn)
            .delete_job_mapping_by_user(job_id, user_id)
            .map_err(Error::from_store)
    }

    pub fn list_jobs_by_user(&self, user_id: &str) -> Result<Vec<String>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn).list_jobs_by_user(user_id).map_err(Error::from_store)
    }

    /// Builds its `WHERE` clause only from the whitelisted columns in
    /// `dm_store::schema::jobs::FILTERABLE`; every other key is dropped
    /// before a query is even prepared.
    pub fn list_jobs_with_filters(
        &self,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<dm_store::JobRecord>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn).list_jobs_with_filters(filters).map_err(Error::from_store)
    }

    pub fn list_jobs_by_status(&self, statuses: &[String]) -> Result<Vec<dm_store::JobInfo>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn).list_jobs_by_status(statuses).map_err(Error::from_store)
    }

    pub fn get_job_metadata(&self, job_id: &str) -> Result<dm_store::JobMetadata> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::JobStore::new(&conn).get_job_metadata(job_id).map_err(Error::from_store)
    }
}

impl JobTrackerBackend for JobTracker {
    fn store_job_mapping(&self, job_id: &str, scheduler_job_id: &str) -> Result<()> {
        JobTracker::store_job_mapping(self, job_id, scheduler_job_id)
    }

    fn get_scheduler_job_id(&self, job_id: &str) -> Result<String> {
        JobTracker::get_scheduler_job_id(self, job_id)
    }

    fn delete_job_mapping(&self, job_id: &str) -> Result<()> {
        JobTracker::delete_job_mapping(self, job_id)
    }
}

impl OwnerLookup for JobTracker {
    fn get_owner(&self, id: &str) -> Result<String> {
        JobTracker::get_job_owner(self, id)
    }
}

/// In-memory backend satisfying only the mapping triple — used by tests
/// and by deployments that run the scheduler adapter without the full
/// store (an optional remote-cache-backed deployment is the other such
/// variant; see `DESIGN.md` for why it is not implemented here).
#[derive(Default)]
pub struct MemoryJobBackend {
    mapping: RwLock<HashMap<String, String>>,
}

impl MemoryJobBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobTrackerBackend for MemoryJobBackend {
    fn store_job_mapping(&self, job_id: &str, scheduler_job_id: &str) -> Result<()> {
        if job_id.is_empty() {
            return Err(Error::CannotBeEmpty("job_id"));
        }
        if scheduler_job_id.is_empty() {
            return Err(Error::CannotBeEmpty("scheduler_job_id"));
        }
        self.mapping
            .write()
            .map_err(|e| Error::generic(e.to_string()))?
            .insert(job_id.to_string(), scheduler_job_id.to_string());
        Ok(())
    }

    fn get_scheduler_job_id(&self, job_id: &str) -> Result<String> {
        self.mapping
            .read()
            .map_err(|e| Error::generic(e.to_string()))?
            .get(job_id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn delete_job_mapping(&self, job_id: &str) -> Result<()> {
        self.mapping.write().map_err(|e| Error::generic(e.to_string()))?.remove(job_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> JobTracker {
        let db = dm_store::Database::open_in_memory().unwrap();
        {
            let conn = db.connection().lock().unwrap();
            conn.execute(
                "INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)",
                [],
            )
            .unwrap();
        }
        JobTracker::new(db)
    }

    #[test]
    fn store_with_user_round_trip() {
        let tracker = tracker();
        tracker.store_job_with_user("job-1", "42", Some("alice")).unwrap();
        assert_eq!(tracker.get_scheduler_job_id("job-1").unwrap(), "42");
        assert_eq!(tracker.get_job_owner("job-1").unwrap(), "alice");
    }

    #[test]
    fn memory_backend_satisfies_mapping_triple() {
        let backend = MemoryJobBackend::new();
        backend.store_job_mapping("job-1", "42").unwrap();
        assert_eq!(backend.get_scheduler_job_id("job-1").unwrap(), "42");
        backend.delete_job_mapping("job-1").unwrap();
        assert!(matches!(backend.get_scheduler_job_id("job-1"), Err(Error::NotFound)));
    }

    #[test]
    fn memory_backend_rejects_empty_ids() {
        let backend = MemoryJobBackend::new();
        assert!(matches!(
            backend.store_job_mapping("", "42"),
            Err(Error::CannotBeEmpty("job_id"))
        ));
        assert!(matches!(
            backend.store_job_mapping("job-1", ""),
            Err(Error::CannotBeEmpty("scheduler_job_id"))
        ));
    }

    #[test]
    fn filter_whitelist_ignores_unknown_keys() {
        let tracker = tracker();
        tracker.store_job_with_user("job-1", "1", Some("alice")).unwrap();
        tracker.store_job_metadata("job-1", None, None, "FEL", "running").unwrap();
        tracker.store_job_with_user("job-2", "2", Some("alice")).unwrap();
        tracker.store_job_metadata("job-2", None, None, "FEL", "pending").unwrap();

        let mut filters = HashMap::new();
        filters.insert("user_id".to_string(), "alice".to_string());
        filters.insert("status".to_string(), "running".to_string());
        filters.insert("evil".to_string(), "x'; DROP TABLE jobs; --".to_string());

        let jobs = tracker.list_jobs_with_filters(&filters).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, "job-1");
    }
}
