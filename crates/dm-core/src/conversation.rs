//! Conversation tracker: chat history attached to a job or
//! standalone, owned by the session that created it.

use crate::error::{Error, Result};
use crate::token::OwnerLookup;

#[derive(Clone)]
pub struct ConversationTracker {
    db: dm_store::Database,
}

impl ConversationTracker {
    pub fn new(db: dm_store::Database) -> Self {
        Self { db }
    }

    fn conn_err(e: impl std::fmt::Display) -> Error {
        Error::generic(e.to_string())
    }

    pub fn create(&self, id: &str, user_id: Option<&str>, title: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::FieldRequired("id"));
        }
        let now = chrono::Utc::now().to_rfc3339();
        let record = dm_store::ConversationRecord {
            id: id.to_string(),
            user_id: user_id.filter(|s| !s.is_empty()).map(str::to_string),
            title: title.to_string(),
            created: now.clone(),
            updated: now,
        };
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::ConversationStore::new(&conn).create(&record).map_err(Error::from_store)
    }

    pub fn get(&self, id: &str) -> Result<Option<dm_store::ConversationRecord>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::ConversationStore::new(&conn).get(id).map_err(Error::from_store)
    }

    pub fn get_by_user(&self, id: &str, user_id: &str) -> Result<dm_store::ConversationRecord> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::ConversationStore::new(&conn).get_by_user(id, user_id).map_err(Error::from_store)
    }

    pub fn list_by_user(&self, user_id: &str) -> Result<Vec<dm_store::ConversationRecord>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::ConversationStore::new(&conn).list_by_user(user_id).map_err(Error::from_store)
    }

    pub fn delete_by_user(&self, id: &str, user_id: &str) -> Result<()> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::ConversationStore::new(&conn).delete_by_user(id, user_id).map_err(Error::from_store)
    }

    /// Appends a message, rejecting empty content before it ever reaches
    /// the store.
    pub fn add_message(&self, conversation_id: &str, role: &str, content: &str) -> Result<i64> {
        if content.is_empty() {
            return Err(Error::ContentEmpty);
        }
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::ConversationStore::new(&conn)
            .add_message(conversation_id, role, content, &now)
            .map_err(Error::from_store)
    }

    pub fn get_conversation_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<dm_store::MessageRecord>> {
        let conn = self.db.connection().lock().map_err(Self::conn_err)?;
        dm_store::ConversationStore::new(&conn)
            .get_conversation_messages(conversation_id)
            .map_err(Error::from_store)
    }

    pub fn get_owner(&self, id: &str) -> Result<String> {
        match self.get(id)? {
            Some(record) => match record.user_id {
                Some(owner) if !owner.is_empty() => Ok(owner),
                _ => Err(Error::NoAssociatedUser),
            },
            None => Err(Error::NotFound),
        }
    }
}

impl OwnerLookup for ConversationTracker {
    fn get_owner(&self, id: &str) -> Result<String> {
        ConversationTracker::get_owner(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ConversationTracker {
        let db = dm_store::Database::open_in_memory().unwrap();
        {
            let conn = db.connection().lock().unwrap();
            conn.execute(
                "INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)",
                [],
            )
            .unwrap();
        }
        ConversationTracker::new(db)
    }

    #[test]
    fn messages_preserve_insertion_order() {
        let tracker = tracker();
        tracker.create("c1", Some("alice"), "chat").unwrap();
        tracker.add_message("c1", "user", "hello").unwrap();
        tracker.add_message("c1", "assistant", "hi").unwrap();

        let messages = tracker.get_conversation_messages("c1").unwrap();
        assert_eq!(
            messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["hello", "hi"]
        );
    }

    #[test]
    fn empty_message_rejected() {
        let tracker = tracker();
        tracker.create("c1", Some("alice"), "chat").unwrap();
        assert!(matches!(
            tracker.add_message("c1", "user", ""),
            Err(Error::ContentEmpty)
        ));
    }

    #[test]
    fn cross_user_access_denied() {
        let tracker = tracker();
        tracker.create("c1", Some("alice"), "chat").unwrap();
        assert!(matches!(
            tracker.get_by_user("c1", "bob"),
            Err(Error::NoAccess)
        ));
    }
}
