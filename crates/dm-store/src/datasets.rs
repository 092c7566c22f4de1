//! Persistence operations for the dataset tracker.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::models::DatasetRecord;
use crate::ownership;
use crate::schema::datasets as col;

/// Database operations for datasets. Content hashing and final-id derivation
/// live above this layer; the store persists whatever record it is given
/// and enforces idempotency and ownership at the row level.
pub struct DatasetStore<'a> {
    conn: &'a Connection,
}

impl<'a> DatasetStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts `record`, or does nothing if a row with the same `id` already
    /// exists — the `(user_id, content_hash)` invariant guarantees that a
    /// repeat insert carries identical content.
    pub fn store_with_user(&self, record: &DatasetRecord) -> crate::Result<()> {
        if record.name.is_empty() {
            return Err(crate::Error::CannotBeEmpty("name"));
        }
        if record.r#type.is_empty() {
            return Err(crate::Error::CannotBeEmpty("type"));
        }

        self.conn.execute(
            &format!(
                "INSERT INTO datasets ({}, {}, {}, {}, {}, {}, {}, {}, {})
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT({}) DO NOTHING",
                col::ID,
                col::USER_ID,
                col::NAME,
                col::TYPE,
                col::DESCRIPTION,
                col::CONTENT_HASH,
                col::DATA_JSON,
                col::CREATED,
                col::UPDATED,
                col::ID,
            ),
            params![
                record.id,
                record.user_id,
                record.name,
                record.r#type,
                record.description,
                record.content_hash,
                record.data_json,
                record.created,
                record.updated,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> crate::Result<Option<DatasetRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {}, {}, {}, {}, {}, {}, {} FROM datasets WHERE {} = ?",
            col::ID,
            col::USER_ID,
            col::NAME,
            col::TYPE,
            col::DESCRIPTION,
            col::CONTENT_HASH,
            col::DATA_JSON,
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

    pub fn get_by_user(&self, id: &str, user_id: &str) -> crate::Result<DatasetRecord> {
        let record = self.get(id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&record.user_id, user_id, crate::Error::NoAccess)?;
        Ok(record)
    }

    pub fn list_by_user(&self, user_id: &str) -> crate::Result<Vec<DatasetRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {}, {}, {}, {}, {}, {}, {} FROM datasets WHERE {} = ? ORDER BY {} ASC",
            col::ID,
            col::USER_ID,
            col::NAME,
            col::TYPE,
            col::DESCRIPTION,
            col::CONTENT_HASH,
            col::DATA_JSON,
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

    /// Applies a whitelisted subset of `updates` (`name`, `type`,
    /// `description`). Unknown keys are ignored; an empty map is a no-op.
    pub fn update_by_user(
        &self,
        id: &str,
        user_id: &str,
        updates: &HashMap<String, String>,
        now: &str,
    ) -> crate::Result<()> {
        let record = self.get(id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&record.user_id, user_id, crate::Error::Permission)?;

        let applicable: Vec<(&str, &str)> = col::UPDATABLE
            .iter()
            .filter_map(|&key| updates.get(key).map(|v| (key, v.as_str())))
            .collect();
        if applicable.is_empty() {
            return Ok(());
        }

        let set_clause = applicable
            .iter()
            .map(|(key, _)| format!("{} = ?", key))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE datasets SET {}, {} = ? WHERE {} = ?",
            set_clause,
            col::UPDATED,
            col::ID
        );

        let mut bound: Vec<&dyn rusqlite::ToSql> =
            applicable.iter().map(|(_, v)| v as &dyn rusqlite::ToSql).collect();
        bound.push(&now);
        bound.push(&id);
        self.conn.execute(&sql, bound.as_slice())?;
        Ok(())
    }

    pub fn delete_by_user(&self, id: &str, user_id: &str) -> crate::Result<()> {
        let record = self.get(id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&record.user_id, user_id, crate::Error::Permission)?;
        self.conn.execute(&format!("DELETE FROM datasets WHERE {} = ?", col::ID), params![id])?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> crate::Result<()> {
        self.conn.execute(&format!("DELETE FROM datasets WHERE {} = ?", col::ID), params![id])?;
        Ok(())
    }

    pub fn delete_all(&self) -> crate::Result<()> {
        self.conn.execute("DELETE FROM datasets", params![])?;
        Ok(())
    }

    pub fn get_owner(&self, id: &str) -> crate::Result<String> {
        let record = self.get(id)?.ok_or(crate::Error::NotFound)?;
        match record.user_id {
            Some(owner) if !owner.is_empty() => Ok(owner),
            _ => Err(crate::Error::NoAssociatedUser),
        }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DatasetRecord> {
        Ok(DatasetRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            r#type: row.get(3)?,
            description: row.get(4)?,
            content_hash: row.get(5)?,
            data_json: row.get(6)?,
            created: row.get(7)?,
            updated: row.get(8)?,
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

    fn sample(id: &str, user_id: Option<&str>) -> DatasetRecord {
        DatasetRecord {
            id: id.to_string(),
            user_id: user_id.map(|s| s.to_string()),
            name: "Test Dataset".to_string(),
            r#type: "alignment".to_string(),
            description: String::new(),
            content_hash: "deadbeef".to_string(),
            data_json: None,
            created: "2026-01-01T00:00:00Z".to_string(),
            updated: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn lifecycle_store_list_delete() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        let store = DatasetStore::new(&conn);
        store.store_with_user(&sample("abc123", Some("alice"))).unwrap();

        assert_eq!(store.get_owner("abc123").unwrap(), "alice");
        assert_eq!(store.list_by_user("alice").unwrap().len(), 1);

        store.delete_by_user("abc123", "alice").unwrap();
        assert!(store.get("abc123").unwrap().is_none());
    }

    #[test]
    fn cross_user_access_denied() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('bob', 0, 0)", params![]).unwrap();
        let store = DatasetStore::new(&conn);
        store.store_with_user(&sample("abc123", Some("alice"))).unwrap();

        assert!(matches!(store.get_by_user("abc123", "bob"), Err(crate::Error::NoAccess)));
        assert!(matches!(store.delete_by_user("abc123", "bob"), Err(crate::Error::Permission)));
    }

    #[test]
    fn store_with_user_is_idempotent() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        let store = DatasetStore::new(&conn);
        let record = sample("abc123", Some("alice"));
        store.store_with_user(&record).unwrap();
        store.store_with_user(&record).unwrap();
        assert_eq!(store.list_by_user("alice").unwrap().len(), 1);
    }

    #[test]
    fn update_by_user_ignores_unknown_keys() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        let store = DatasetStore::new(&conn);
        store.store_with_user(&sample("abc123", Some("alice"))).unwrap();

        let mut updates = HashMap::new();
        updates.insert("description".to_string(), "updated".to_string());
        updates.insert("content_hash".to_string(), "ignored".to_string());
        store.update_by_user("abc123", "alice", &updates, "2026-01-02T00:00:00Z").unwrap();

        let record = store.get("abc123").unwrap().unwrap();
        assert_eq!(record.description, "updated");
        assert_eq!(record.content_hash, "deadbeef");
    }
}
