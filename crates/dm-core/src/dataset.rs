//! Dataset tracker: content-addressed storage of
//! user-uploaded artifacts, one row in the store plus one file on disk.

use std::collections::HashMap;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::config::DatasetConfig;
use crate::error::{Error, Result};
use crate::token::OwnerLookup;

/// A dataset awaiting storage. `Validate` is run by `store_with_user`
/// before anything is written.
#[derive(Debug, Clone)]
pub struct NewDataset {
    pub name: String,
    pub r#type: String,
    pub description: String,
    pub content: Vec<u8>,
    pub data_json: Option<serde_json::Value>,
}

impl NewDataset {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::FieldRequired("name"));
        }
        if self.r#type.is_empty() {
            return Err(Error::FieldRequired("type"));
        }
        if self.content.is_empty() {
            return Err(Error::ContentEmpty);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct DatasetTracker {
    db: dm_store::Database,
    dataset_dir: PathBuf,
}

impl DatasetTracker {
    pub fn new(db: dm_store::Database, config: DatasetConfig) -> Self {
        Self { db, dataset_dir: config.dataset_dir }
    }

    pub fn content_path(&self, id: &str) -> PathBuf {
        self.dataset_dir.join(id)
    }

    /// Validates `ds`, derives the content-addressed id, writes the content
    /// to `<dataset_dir>/<id>`, and persists the metadata row. Idempotent on
    /// `(user_id, content_hash)`: a repeat store with identical content and
    /// owner is a no-op on both the filesystem and the row.
    pub fn store_with_user(&self, ds: &NewDataset, user_id: Option<&str>) -> Result<String> {
        ds.validate()?;

        let content_hash = hex::encode(Sha256::digest(&ds.content));
        let owner = user_id.filter(|s| !s.is_empty());
        let final_id = match owner {
            Some(uid) => {
                let mut hasher = Sha256::new();
                hasher.update(uid.as_bytes());
                hasher.update(content_hash.as_bytes());
                hex::encode(hasher.finalize())
            }
            None => content_hash.clone(),
        };

        std::fs::create_dir_all(&self.dataset_dir)?;
        let path = self.content_path(&final_id);
        if !path.exists() {
            std::fs::write(&path, &ds.content)?;
        }

        let now = chrono::Utc::now().to_rfc3339();
        let record = dm_store::DatasetRecord {
            id: final_id.clone(),
            user_id: owner.map(str::to_string),
            name: ds.name.clone(),
            r#type: ds.r#type.clone(),
            description: ds.description.clone(),
            content_hash,
            data_json: ds.data_json.as_ref().map(|v| v.to_string()),
            created: now.clone(),
            updated: now,
        };

        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn).store_with_user(&record).map_err(Error::from_store)?;
        Ok(final_id)
    }

    pub fn get(&self, id: &str) -> Result<Option<dm_store::DatasetRecord>> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn).get(id).map_err(Error::from_store)
    }

    pub fn get_by_user(&self, id: &str, user_id: &str) -> Result<dm_store::DatasetRecord> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn).get_by_user(id, user_id).map_err(Error::from_store)
    }

    pub fn list_by_user(&self, user_id: &str) -> Result<Vec<dm_store::DatasetRecord>> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn).list_by_user(user_id).map_err(Error::from_store)
    }

    pub fn update_by_user(
        &self,
        id: &str,
        user_id: &str,
        updates: &HashMap<String, String>,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn)
            .update_by_user(id, user_id, updates, &now)
            .map_err(Error::from_store)
    }

    pub fn delete_by_user(&self, id: &str, user_id: &str) -> Result<()> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn).delete_by_user(id, user_id).map_err(Error::from_store)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn).delete(id).map_err(Error::from_store)
    }

    pub fn delete_all(&self) -> Result<()> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn).delete_all().map_err(Error::from_store)
    }

    pub fn get_owner(&self, id: &str) -> Result<String> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::DatasetStore::new(&conn).get_owner(id).map_err(Error::from_store)
    }
}

impl OwnerLookup for DatasetTracker {
    fn get_owner(&self, id: &str) -> Result<String> {
        DatasetTracker::get_owner(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> (DatasetTracker, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = dm_store::Database::open_in_memory().unwrap();
        {
            let conn = db.connection().lock().unwrap();
            conn.execute(
                "INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO sessions (subject, created_at, last_seen) VALUES ('bob', 0, 0)",
                [],
            )
            .unwrap();
        }
        let tracker =
            DatasetTracker::new(db, DatasetConfig { dataset_dir: dir.path().to_path_buf() });
        (tracker, dir)
    }

    fn sample() -> NewDataset {
        NewDataset {
            name: "Test Dataset".to_string(),
            r#type: "alignment".to_string(),
            description: String::new(),
            content: b">seq1\nACGT\n>seq2\nTGCA\n".to_vec(),
            data_json: None,
        }
    }

    #[test]
    fn dataset_lifecycle() {
        let (tracker, _dir) = tracker();
        let id = tracker.store_with_user(&sample(), Some("alice")).unwrap();

        assert_eq!(tracker.get_owner(&id).unwrap(), "alice");
        assert_eq!(tracker.list_by_user("alice").unwrap().len(), 1);
        assert!(tracker.content_path(&id).exists());

        tracker.delete_by_user(&id, "alice").unwrap();
        assert!(tracker.get(&id).unwrap().is_none());
    }

    #[test]
    fn cross_user_access_denied() {
        let (tracker, _dir) = tracker();
        let id = tracker.store_with_user(&sample(), Some("alice")).unwrap();

        assert!(matches!(
            tracker.get_by_user(&id, "bob"),
            Err(Error::NoAccess)
        ));
        assert!(matches!(
            tracker.delete_by_user(&id, "bob"),
            Err(Error::Permission)
        ));
    }

    #[test]
    fn same_content_different_users_yields_distinct_ids() {
        let (tracker, _dir) = tracker();
        let alice_id = tracker.store_with_user(&sample(), Some("alice")).unwrap();
        let bob_id = tracker.store_with_user(&sample(), Some("bob")).unwrap();
        assert_ne!(alice_id, bob_id);
    }

    #[test]
    fn empty_fields_rejected() {
        let (tracker, _dir) = tracker();
        let mut ds = sample();
        ds.name = String::new();
        assert!(matches!(
            tracker.store_with_user(&ds, Some("alice")),
            Err(Error::FieldRequired("name"))
        ));

        let mut ds = sample();
        ds.content = Vec::new();
        assert!(matches!(
            tracker.store_with_user(&ds, Some("alice")),
            Err(Error::ContentEmpty)
        ));
    }
}
