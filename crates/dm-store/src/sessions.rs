//! Persistence operations for the session tracker.

use rusqlite::{params, Connection};

use crate::models::SessionRecord;
use crate::schema::sessions as col;

/// Database operations for sessions.
pub struct SessionStore<'a> {
    conn: &'a Connection,
}

impl<'a> SessionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts a fresh session with `created_at = last_seen = now`.
    pub fn create_session(&self, subject: &str, now: i64) -> crate::Result<()> {
        if subject.is_empty() {
            return Err(crate::Error::CannotBeEmpty("subject"));
        }
        self.conn.execute(
            &format!(
                "INSERT INTO sessions ({}, {}, {}) VALUES (?, ?, ?)",
                col::SUBJECT,
                col::CREATED_AT,
                col::LAST_SEEN
            ),
            params![subject, now, now],
        )?;
        Ok(())
    }

    pub fn get_session(&self, subject: &str) -> crate::Result<Option<SessionRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {} FROM sessions WHERE {} = ?",
            col::SUBJECT,
            col::CREATED_AT,
            col::LAST_SEEN,
            col::SUBJECT
        ))?;

        let mut rows = stmt.query_map(params![subject], |row| {
            Ok(SessionRecord {
                subject: row.get(0)?,
                created_at: row.get(1)?,
                last_seen: row.get(2)?,
            })
        })?;

        match rows.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    pub fn update_last_seen(&self, subject: &str, now: i64) -> crate::Result<()> {
        let changed = self.conn.execute(
            &format!("UPDATE sessions SET {} = ? WHERE {} = ?", col::LAST_SEEN, col::SUBJECT),
            params![now, subject],
        )?;
        if changed == 0 {
            return Err(crate::Error::NotFound);
        }
        Ok(())
    }

    pub fn delete_session(&self, subject: &str) -> crate::Result<()> {
        self.conn
            .execute(&format!("DELETE FROM sessions WHERE {} = ?", col::SUBJECT), params![subject])?;
        Ok(())
    }

    /// Deletes every session whose `last_seen` is older than `max_age`
    /// seconds relative to `now`, returning the number removed. Cascades to
    /// every owned dataset, job, conversation and visualization.
    pub fn cleanup_expired_sessions(&self, now: i64, max_age: i64) -> crate::Result<usize> {
        let cutoff = now - max_age;
        let changed = self
            .conn
            .execute(&format!("DELETE FROM sessions WHERE {} < ?", col::LAST_SEEN), params![cutoff])?;
        Ok(changed)
    }
}
