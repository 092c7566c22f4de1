//! Session tracker: anonymous, unguessable sessions.

use rand::RngCore;

use crate::error::{Error, Result};

/// Creates, touches and expires anonymous sessions backed by the unified
/// store. `subject` is a ≥128-bit random id rendered as lowercase hex,
/// generated with `rand::RngCore` rather than a UUID (whose version/variant
/// bits are not uniformly random) so it stays unguessable.
#[derive(Clone)]
pub struct SessionTracker {
    db: dm_store::Database,
}

impl SessionTracker {
    pub fn new(db: dm_store::Database) -> Self {
        Self { db }
    }

    fn generate_subject() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Allocates a fresh subject and inserts `created_at = last_seen = now`.
    pub fn create_session(&self) -> Result<String> {
        let subject = Self::generate_subject();
        let now = chrono::Utc::now().timestamp();
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::SessionStore::new(&conn)
            .create_session(&subject, now)
            .map_err(Error::from_store)?;
        tracing::info!(subject = %subject, "created session");
        Ok(subject)
    }

    pub fn get_session(&self, subject: &str) -> Result<Option<dm_store::SessionRecord>> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::SessionStore::new(&conn).get_session(subject).map_err(Error::from_store)
    }

    pub fn update_last_seen(&self, subject: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::SessionStore::new(&conn).update_last_seen(subject, now).map_err(Error::from_store)
    }

    pub fn delete_session(&self, subject: &str) -> Result<()> {
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::SessionStore::new(&conn).delete_session(subject).map_err(Error::from_store)
    }

    /// Deletes every session whose `last_seen` is older than `max_age`
    /// seconds, returning the count removed. Cascades to every owned
    /// dataset, job, conversation and visualization.
    pub fn cleanup_expired_sessions(&self, max_age: i64) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.db.connection().lock().map_err(|e| Error::generic(e.to_string()))?;
        dm_store::SessionStore::new(&conn)
            .cleanup_expired_sessions(now, max_age)
            .map_err(Error::from_store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SessionTracker {
        SessionTracker::new(dm_store::Database::open_in_memory().unwrap())
    }

    #[test]
    fn create_yields_unguessable_hex_subject() {
        let tracker = tracker();
        let subject = tracker.create_session().unwrap();
        assert_eq!(subject.len(), 32);
        assert!(subject.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(tracker.get_session(&subject).unwrap().is_some());
    }

    #[test]
    fn two_sessions_never_collide() {
        let tracker = tracker();
        let a = tracker.create_session().unwrap();
        let b = tracker.create_session().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn touch_and_delete() {
        let tracker = tracker();
        let subject = tracker.create_session().unwrap();
        tracker.update_last_seen(&subject).unwrap();
        tracker.delete_session(&subject).unwrap();
        assert!(tracker.get_session(&subject).unwrap().is_none());
    }
}
