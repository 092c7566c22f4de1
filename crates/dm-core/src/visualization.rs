//! Visualization tracker: rendered plot specs attached to a
//! job and/or dataset.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::token::OwnerLookup;

#[derive(Debug, Clone)]
pub struct NewVisualization {
    pub viz_id: String,
    pub job_id: Option<String>,
    pub dataset_id: Option<String>,
    pub title: String,
    pub description: String,
    pub spec: serde_json::Value,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct VisualizationTracker {
    db: dm_store::Database,
}

impl VisualizationTracker {
    pub fn new(db: dm_store::Database) -> Self {
        Self { db }
    }

    fn conn_err(e: impl std::fmt::Display) -> Error {
        Error::generic(e.to_string())
    }

    pub fn create(&self, viz: &NewVisualization, user_id: Option<&str>) -> Result<()> {
        if viz.viz_id.is_empty() {
            return Err(Error::FieldRequired("viz_id"));
        }
        let now = chrono::Utc::now().to_rfc3339();
        let record = dm_store::VisualizationRecord {
            viz_id: viz.viz_id.clone(),
            user_id: user_id.filter(|s| !s.is_empty()).map(str::to_string),
            job_id: viz.job_id.clone(),
            dataset_id: viz.dataset_id.clone(),
            title: viz.title.clone(),
            description: viz.description.clone(),
            spec: viz.spec.to_string(),
            metadata: viz.metadata.as_ref().map(|v| v.to_string()),
            created: now.clone(),
            updated: now,
        };
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::VisualizationStore::new(&conn).create(&record).map_err(Error::from_store)
    }

    pub fn get(&self, viz_id: &str) -> Result<Option<dm_store::VisualizationRecord>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::VisualizationStore::new(&conn).get(viz_id).map_err(Error::from_store)
    }

    pub fn get_by_user(
        &self,
        viz_id: &str,
        user_id: &str,
    ) -> Result<dm_store::VisualizationRecord> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::VisualizationStore::new(&conn)
            .get_by_user(viz_id, user_id)
            .map_err(Error::from_store)
    }

    pub fn list_by_user(&self, user_id: &str) -> Result<Vec<dm_store::VisualizationRecord>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::VisualizationStore::new(&conn).list_by_user(user_id).map_err(Error::from_store)
    }

    pub fn list_by_job(
        &self,
        job_id: &str,
        subject: &str,
    ) -> Result<Vec<dm_store::VisualizationRecord>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::VisualizationStore::new(&conn)
            .list_by_job(job_id, subject)
            .map_err(Error::from_store)
    }

    pub fn list_by_dataset(
        &self,
        dataset_id: &str,
        subject: &str,
    ) -> Result<Vec<dm_store::VisualizationRecord>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::VisualizationStore::new(&conn)
            .list_by_dataset(dataset_id, subject)
            .map_err(Error::from_store)
    }

    pub fn update_by_user(
        &self,
        viz_id: &str,
        user_id: &str,
        updates: &HashMap<String, String>,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::VisualizationStore::new(&conn)
            .update_by_user(viz_id, user_id, updates, &now)
            .map_err(Error::from_store)
    }

    pub fn delete_by_user(&self, viz_id: &str, user_id: &str) -> Result<()> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::VisualizationStore::new(&conn)
            .delete_by_user(viz_id, user_id)
            .map_err(Error::from_store)
    }

    pub fn get_owner(&self, viz_id: &str) -> Result<String> {
        match self.get(viz_id)? {
            Some(record) => match record.user_id {
                Some(owner) if !owner.is_empty() => Ok(owner),
                _ => Err(Error::NoAssociatedUser),
            },
            None => Err(Error::NotFound),
        }
    }
}

impl OwnerLookup for VisualizationTracker {
    fn get_owner(&self, id: &str) -> Result<String> {
        VisualizationTracker::get_owner(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> VisualizationTracker {
        let db = dm_store::Database::open_in_memory().unwrap();
        {
            let conn = db.connection().lock().unwrap();
            conn.execute(
                "INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO jobs (job_id, scheduler_job_id, user_id, created_at, updated_at) VALUES ('job-1', '1', 'alice', 0, 0)",
                [],
            )
            .unwrap();
        }
        VisualizationTracker::new(db)
    }

    fn sample() -> NewVisualization {
        NewVisualization {
            viz_id: "viz-1".to_string(),
            job_id: Some("job-1".to_string()),
            dataset_id: None,
            title: "tree plot".to_string(),
            description: String::new(),
            spec: serde_json::json!({"type": "tree"}),
            metadata: None,
        }
    }

    #[test]
    fn lifecycle_and_scoped_listing() {
        let tracker = tracker();
        tracker.create(&sample(), Some("alice")).unwrap();

        assert_eq!(tracker.list_by_job("job-1", "alice").unwrap().len(), 1);
        assert_eq!(tracker.list_by_job("job-1", "bob").unwrap().len(), 0);

        tracker.delete_by_user("viz-1", "alice").unwrap();
        assert!(tracker.get("viz-1").unwrap().is_none());
    }

    #[test]
    fn cross_user_access_denied() {
        let tracker = tracker();
        tracker.create(&sample(), Some("alice")).unwrap();
        assert!(matches!(
            tracker.get_by_user("viz-1", "bob"),
            Err(Error::NoAccess)
        ));
    }
}
