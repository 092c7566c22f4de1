//! Persistence operations for the conversation tracker.

use rusqlite::{params, Connection};

use crate::models::{ConversationRecord, MessageRecord};
use crate::ownership;
use crate::schema::{conversations as col, messages as mcol};

/// Database operations for conversations and their messages.
pub struct ConversationStore<'a> {
    conn: &'a Connection,
}

impl<'a> ConversationStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, record: &ConversationRecord) -> crate::Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO conversations ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
                col::ID,
                col::USER_ID,
                col::TITLE,
                col::CREATED,
                col::UPDATED,
            ),
            params![record.id, record.user_id, record.title, record.created, record.updated],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> crate::Result<Option<ConversationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {}, {}, {} FROM conversations WHERE {} = ?",
            col::ID,
            col::USER_ID,
            col::TITLE,
            col::CREATED,
            col::UPDATED,
            col::ID,
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_row)?;
        match rows.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    pub fn get_by_user(&self, id: &str, user_id: &str) -> crate::Result<ConversationRecord> {
        let record = self.get(id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&record.user_id, user_id, crate::Error::NoAccess)?;
        Ok(record)
    }

    pub fn list_by_user(&self, user_id: &str) -> crate::Result<Vec<ConversationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {}, {}, {} FROM conversations WHERE {} = ? ORDER BY {} ASC",
            col::ID,
            col::USER_ID,
            col::TITLE,
            col::CREATED,
            col::UPDATED,
            col::USER_ID,
            col::CREATED,
        ))?;
        let rows = stmt.query_map(params![user_id], Self::map_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn delete_by_user(&self, id: &str, user_id: &str) -> crate::Result<()> {
        let record = self.get(id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&record.user_id, user_id, crate::Error::Permission)?;
        self.conn
            .execute(&format!("DELETE FROM conversations WHERE {} = ?", col::ID), params![id])?;
        Ok(())
    }

    /// Appends a message. Concurrent callers are serialized by the store's
    /// single connection, so insertion order is preserved per conversation.
    pub fn add_message(
        &self,
        conversation_id: &str,
        role: &str,
        content: &str,
        timestamp: &str,
    ) -> crate::Result<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO messages ({}, {}, {}, {}) VALUES (?, ?, ?, ?)",
                mcol::CONVERSATION_ID,
                mcol::ROLE,
                mcol::CONTENT,
                mcol::TIMESTAMP,
            ),
            params![conversation_id, role, content, timestamp],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_conversation_messages(
        &self,
        conversation_id: &str,
    ) -> crate::Result<Vec<MessageRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {}, {}, {} FROM messages WHERE {} = ? ORDER BY {} ASC",
            mcol::ID,
            mcol::CONVERSATION_ID,
            mcol::ROLE,
            mcol::CONTENT,
            mcol::TIMESTAMP,
            mcol::CONVERSATION_ID,
            mcol::ID,
        ))?;
        let rows = stmt.query_map(params![conversation_id], |row| {
            Ok(MessageRecord {
                id: row.get(0)?,
                conversation_id: row.get(1)?,
                role: row.get(2)?,
                content: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationRecord> {
        Ok(ConversationRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            created: row.get(3)?,
            updated: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        crate::migrations::MigrationManager::migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn messages_preserve_insertion_order() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        let store = ConversationStore::new(&conn);
        store
            .create(&ConversationRecord {
                id: "c1".to_string(),
                user_id: Some("alice".to_string()),
                title: String::new(),
                created: "t0".to_string(),
                updated: "t0".to_string(),
            })
            .unwrap();

        store.add_message("c1", "user", "hello", "t1").unwrap();
        store.add_message("c1", "assistant", "hi", "t2").unwrap();
        store.add_message("c1", "user", "thanks", "t3").unwrap();

        let messages = store.get_conversation_messages("c1").unwrap();
        assert_eq!(
            messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["hello", "hi", "thanks"]
        );
    }

    #[test]
    fn cascade_delete_on_session_removes_conversation() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        let store = ConversationStore::new(&conn);
        store
            .create(&ConversationRecord {
                id: "c1".to_string(),
                user_id: Some("alice".to_string()),
                title: String::new(),
                created: "t0".to_string(),
                updated: "t0".to_string(),
            })
            .unwrap();
        store.add_message("c1", "user", "hello", "t1").unwrap();

        conn.execute("DELETE FROM sessions WHERE subject = 'alice'", params![]).unwrap();

        assert!(store.get("c1").unwrap().is_none());
        assert!(store.get_conversation_messages("c1").unwrap().is_empty());
    }
}
