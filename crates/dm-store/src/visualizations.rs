//! Persistence operations for the visualization tracker.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::models::VisualizationRecord;
use crate::ownership;
use crate::schema::visualizations as col;

/// Database operations for visualizations.
pub struct VisualizationStore<'a> {
    conn: &'a Connection,
}

impl<'a> VisualizationStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, record: &VisualizationRecord) -> crate::Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO visualizations ({}, {}, {}, {}, {}, {}, {}, {}, {}, {})
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                col::VIZ_ID,
                col::USER_ID,
                col::JOB_ID,
                col::DATASET_ID,
                col::TITLE,
                col::DESCRIPTION,
                col::SPEC,
                col::METADATA,
                col::CREATED,
                col::UPDATED,
            ),
            params![
                record.viz_id,
                record.user_id,
                record.job_id,
                record.dataset_id,
                record.title,
                record.description,
                record.spec,
                record.metadata,
                record.created,
                record.updated,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, viz_id: &str) -> crate::Result<Option<VisualizationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {}, {}, {}, {}, {}, {}, {}, {}, {} FROM visualizations WHERE {} = ?",
            col::VIZ_ID,
            col::USER_ID,
            col::JOB_ID,
            col::DATASET_ID,
            col::TITLE,
            col::DESCRIPTION,
            col::SPEC,
            col::METADATA,
            col::CREATED,
            col::UPDATED,
            col::VIZ_ID,
        ))?;
        let mut rows = stmt.query_map(params![viz_id], Self::map_row)?;
        match rows.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    pub fn get_by_user(&self, viz_id: &str, user_id: &str) -> crate::Result<VisualizationRecord> {
        let record = self.get(viz_id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&record.user_id, user_id, crate::Error::NoAccess)?;
        Ok(record)
    }

    pub fn list_by_user(&self, user_id: &str) -> crate::Result<Vec<VisualizationRecord>> {
        self.list_where(&format!("{} = ?", col::USER_ID), params![user_id])
    }

    /// Scopes listing by job, and additionally enforces ownership on the
    /// outer row via `subject`.
    pub fn list_by_job(
        &self,
        job_id: &str,
        subject: &str,
    ) -> crate::Result<Vec<VisualizationRecord>> {
        self.list_where(
            &format!("{} = ? AND {} = ?", col::JOB_ID, col::USER_ID),
            params![job_id, subject],
        )
    }

    pub fn list_by_dataset(
        &self,
        dataset_id: &str,
        subject: &str,
    ) -> crate::Result<Vec<VisualizationRecord>> {
        self.list_where(
            &format!("{} = ? AND {} = ?", col::DATASET_ID, col::USER_ID),
            params![dataset_id, subject],
        )
    }

    pub fn update_by_user(
        &self,
        viz_id: &str,
        user_id: &str,
        updates: &HashMap<String, String>,
        now: &str,
    ) -> crate::Result<()> {
        let record = self.get(viz_id)?.ok_or(crate::Error::NotFound)?;
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
            "UPDATE visualizations SET {}, {} = ? WHERE {} = ?",
            set_clause,
            col::UPDATED,
            col::VIZ_ID
        );
        let mut bound: Vec<&dyn rusqlite::ToSql> =
            applicable.iter().map(|(_, v)| v as &dyn rusqlite::ToSql).collect();
        bound.push(&now);
        bound.push(&viz_id);
        self.conn.execute(&sql, bound.as_slice())?;
        Ok(())
    }

    pub fn delete_by_user(&self, viz_id: &str, user_id: &str) -> crate::Result<()> {
        let record = self.get(viz_id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&record.user_id, user_id, crate::Error::Permission)?;
        self.conn.execute(
            &format!("DELETE FROM visualizations WHERE {} = ?", col::VIZ_ID),
            params![viz_id],
        )?;
        Ok(())
    }

    fn list_where(
        &self,
        clause: &str,
        bound: impl rusqlite::Params,
    ) -> crate::Result<Vec<VisualizationRecord>> {
        let sql = format!(
            "SELECT {}, {}, {}, {}, {}, {}, {}, {}, {}, {} FROM visualizations WHERE {} ORDER BY {} ASC",
            col::VIZ_ID,
            col::USER_ID,
            col::JOB_ID,
            col::DATASET_ID,
            col::TITLE,
            col::DESCRIPTION,
            col::SPEC,
            col::METADATA,
            col::CREATED,
            col::UPDATED,
            clause,
            col::CREATED,
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bound, Self::map_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VisualizationRecord> {
        Ok(VisualizationRecord {
            viz_id: row.get(0)?,
            user_id: row.get(1)?,
            job_id: row.get(2)?,
            dataset_id: row.get(3)?,
            title: row.get(4)?,
            description: row.get(5)?,
            spec: row.get(6)?,
            metadata: row.get(7)?,
            created: row.get(8)?,
            updated: row.get(9)?,
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

    fn sample(viz_id: &str, job_id: Option<&str>) -> VisualizationRecord {
        VisualizationRecord {
            viz_id: viz_id.to_string(),
            user_id: Some("alice".to_string()),
            job_id: job_id.map(|s| s.to_string()),
            dataset_id: None,
            title: "tree plot".to_string(),
            description: String::new(),
            spec: "{}".to_string(),
            metadata: None,
            created: "t0".to_string(),
            updated: "t0".to_string(),
        }
    }

    #[test]
    fn cascade_delete_on_job_removes_visualization() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        conn.execute(
            "INSERT INTO jobs (job_id, scheduler_job_id, user_id, created_at, updated_at) VALUES ('job-1', '1', 'alice', 0, 0)",
            params![],
        )
        .unwrap();
        let store = VisualizationStore::new(&conn);
        store.create(&sample("viz-1", Some("job-1"))).unwrap();

        conn.execute("DELETE FROM jobs WHERE job_id = 'job-1'", params![]).unwrap();
        assert!(store.get("viz-1").unwrap().is_none());
    }

    #[test]
    fn list_by_job_scopes_and_enforces_ownership() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        conn.execute(
            "INSERT INTO jobs (job_id, scheduler_job_id, user_id, created_at, updated_at) VALUES ('job-1', '1', 'alice', 0, 0)",
            params![],
        )
        .unwrap();
        let store = VisualizationStore::new(&conn);
        store.create(&sample("viz-1", Some("job-1"))).unwrap();

        assert_eq!(store.list_by_job("job-1", "alice").unwrap().len(), 1);
        assert_eq!(store.list_by_job("job-1", "bob").unwrap().len(), 0);
    }
}
