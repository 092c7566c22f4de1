//! Persistence operations for the job tracker.
//!
//! The job table encodes both the scheduler mapping and the analysis
//! metadata so that listing and filtering are a single query.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::models::{JobInfo, JobMetadata, JobRecord};
use crate::ownership;
use crate::schema::jobs as col;

/// Database operations for jobs.
pub struct JobStore<'a> {
    conn: &'a Connection,
}

impl<'a> JobStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Upserts the jobId/schedulerJobId mapping with no user binding. Both
    /// arguments are required on every call.
    pub fn store_job_mapping(
        &self,
        job_id: &str,
        scheduler_job_id: &str,
        now: i64,
    ) -> crate::Result<()> {
        if job_id.is_empty() {
            return Err(crate::Error::CannotBeEmpty("job_id"));
        }
        if scheduler_job_id.is_empty() {
            return Err(crate::Error::CannotBeEmpty("scheduler_job_id"));
        }

        self.conn.execute(
            &format!(
                "INSERT INTO jobs ({jid}, {sjid}, {created}, {updated})
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT({jid}) DO UPDATE SET {sjid} = excluded.{sjid}, {updated} = excluded.{updated}",
                jid = col::JOB_ID,
                sjid = col::SCHEDULER_JOB_ID,
                created = col::CREATED_AT,
                updated = col::UPDATED_AT,
            ),
            params![job_id, scheduler_job_id, now, now],
        )?;
        Ok(())
    }

    /// Upserts the mapping plus a user binding. An empty `user_id` preserves
    /// any existing owner; an empty `scheduler_job_id` is rejected only when
    /// the row does not yet exist, otherwise the existing value is kept.
    pub fn store_job_with_user(
        &self,
        job_id: &str,
        scheduler_job_id: &str,
        user_id: Option<&str>,
        now: i64,
    ) -> crate::Result<()> {
        if job_id.is_empty() {
            return Err(crate::Error::CannotBeEmpty("job_id"));
        }

        match self.get_row(job_id)? {
            None => {
                if scheduler_job_id.is_empty() {
                    return Err(crate::Error::CannotBeEmpty("scheduler_job_id"));
                }
                let owner = user_id.filter(|s| !s.is_empty());
                self.conn.execute(
                    &format!(
                        "INSERT INTO jobs ({jid}, {sjid}, {uid}, {created}, {updated}) VALUES (?, ?, ?, ?, ?)",
                        jid = col::JOB_ID,
                        sjid = col::SCHEDULER_JOB_ID,
                        uid = col::USER_ID,
                        created = col::CREATED_AT,
                        updated = col::UPDATED_AT,
                    ),
                    params![job_id, scheduler_job_id, owner, now, now],
                )?;
            }
            Some(existing) => {
                let new_scheduler_id = if scheduler_job_id.is_empty() {
                    existing.scheduler_job_id
                } else {
                    scheduler_job_id.to_string()
                };
                let new_owner = match user_id {
                    None | Some("") => existing.user_id,
                    Some(u) => Some(u.to_string()),
                };
                self.conn.execute(
                    &format!(
                        "UPDATE jobs SET {sjid} = ?, {uid} = ?, {updated} = ? WHERE {jid} = ?",
                        sjid = col::SCHEDULER_JOB_ID,
                        uid = col::USER_ID,
                        updated = col::UPDATED_AT,
                        jid = col::JOB_ID,
                    ),
                    params![new_scheduler_id, new_owner, now, job_id],
                )?;
            }
        }
        Ok(())
    }

    /// Sets analysis metadata on an existing job row.
    pub fn store_job_metadata(
        &self,
        job_id: &str,
        alignment_id: Option<&str>,
        tree_id: Option<&str>,
        method_type: &str,
        status: &str,
        now: i64,
    ) -> crate::Result<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE jobs SET {al} = ?, {tr} = ?, {mt} = ?, {st} = ?, {up} = ? WHERE {jid} = ?",
                al = col::ALIGNMENT_ID,
                tr = col::TREE_ID,
                mt = col::METHOD_TYPE,
                st = col::STATUS,
                up = col::UPDATED_AT,
                jid = col::JOB_ID,
            ),
            params![alignment_id, tree_id, method_type, status, now, job_id],
        )?;
        if changed == 0 {
            return Err(crate::Error::NotFound);
        }
        Ok(())
    }

    pub fn get_scheduler_job_id(&self, job_id: &str) -> crate::Result<String> {
        let row = self.get_row(job_id)?.ok_or(crate::Error::NotFound)?;
        Ok(row.scheduler_job_id)
    }

    pub fn get_scheduler_job_id_by_user(
        &self,
        job_id: &str,
        user_id: &str,
    ) -> crate::Result<String> {
        let row = self.get_row(job_id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&row.user_id, user_id, crate::Error::Permission)?;
        Ok(row.scheduler_job_id)
    }

    pub fn get_job_owner(&self, job_id: &str) -> crate::Result<String> {
        let row = self.get_row(job_id)?.ok_or(crate::Error::NotFound)?;
        match row.user_id {
            Some(owner) if !owner.is_empty() => Ok(owner),
            _ => Err(crate::Error::NoAssociatedUser),
        }
    }

    pub fn update_job_status(&self, job_id: &str, status: &str, now: i64) -> crate::Result<()> {
        let changed = self.conn.execute(
            &format!("UPDATE jobs SET {st} = ?, {up} = ? WHERE {jid} = ?", st = col::STATUS, up = col::UPDATED_AT, jid = col::JOB_ID),
            params![status, now, job_id],
        )?;
        if changed == 0 {
            return Err(crate::Error::NotFound);
        }
        Ok(())
    }

    pub fn update_job_status_by_user(
        &self,
        job_id: &str,
        user_id: &str,
        status: &str,
        now: i64,
    ) -> crate::Result<()> {
        let row = self.get_row(job_id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&row.user_id, user_id, crate::Error::Permission)?;
        self.update_job_status(job_id, status, now)
    }

    /// Deletes the job row. Owned visualizations cascade via the foreign key.
    pub fn delete_job_mapping(&self, job_id: &str) -> crate::Result<()> {
        self.conn.execute(&format!("DELETE FROM jobs WHERE {} = ?", col::JOB_ID), params![job_id])?;
        Ok(())
    }

    pub fn delete_job_mapping_by_user(&self, job_id: &str, user_id: &str) -> crate::Result<()> {
        let row = self.get_row(job_id)?.ok_or(crate::Error::NotFound)?;
        ownership::check(&row.user_id, user_id, crate::Error::Permission)?;
        self.delete_job_mapping(job_id)
    }

    pub fn list_jobs_by_user(&self, user_id: &str) -> crate::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM jobs WHERE {} = ? ORDER BY {} ASC",
            col::JOB_ID,
            col::USER_ID,
            col::CREATED_AT,
        ))?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Builds a dynamic `WHERE` clause from only the whitelisted filter
    /// columns. Keys outside the whitelist are silently dropped; every
    /// surviving value is bound, never interpolated.
    pub fn list_jobs_with_filters(
        &self,
        filters: &HashMap<String, String>,
    ) -> crate::Result<Vec<JobRecord>> {
        let applicable: Vec<(&str, &str)> = col::FILTERABLE
            .iter()
            .filter_map(|&key| filters.get(key).map(|v| (key, v.as_str())))
            .collect();

        let mut sql = format!(
            "SELECT {jid}, {sjid}, {uid}, {al}, {tr}, {mt}, {st}, {ca}, {ua} FROM jobs",
            jid = col::JOB_ID,
            sjid = col::SCHEDULER_JOB_ID,
            uid = col::USER_ID,
            al = col::ALIGNMENT_ID,
            tr = col::TREE_ID,
            mt = col::METHOD_TYPE,
            st = col::STATUS,
            ca = col::CREATED_AT,
            ua = col::UPDATED_AT,
        );
        if !applicable.is_empty() {
            let clause = applicable
                .iter()
                .map(|(key, _)| format!("{} = ?", key))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        sql.push_str(&format!(" ORDER BY {} ASC", col::CREATED_AT));

        let bound: Vec<&dyn rusqlite::ToSql> =
            applicable.iter().map(|(_, v)| v as &dyn rusqlite::ToSql).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bound.as_slice(), Self::map_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn list_jobs_by_status(&self, statuses: &[String]) -> crate::Result<Vec<JobInfo>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = statuses.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT {jid}, {uid}, {st} FROM jobs WHERE {st} IN ({placeholders}) ORDER BY {ca} ASC",
            jid = col::JOB_ID,
            uid = col::USER_ID,
            st = col::STATUS,
            ca = col::CREATED_AT,
        );
        let bound: Vec<&dyn rusqlite::ToSql> =
            statuses.iter().map(|s| s as &dyn rusqlite::ToSql).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bound.as_slice(), |row| {
            Ok(JobInfo { job_id: row.get(0)?, user_id: row.get(1)?, status: row.get(2)? })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn get_job_metadata(&self, job_id: &str) -> crate::Result<JobMetadata> {
        let row = self.get_row(job_id)?.ok_or(crate::Error::NotFound)?;
        Ok(JobMetadata {
            alignment_id: row.alignment_id,
            tree_id: row.tree_id,
            method_type: row.method_type,
            status: row.status,
        })
    }

    fn get_row(&self, job_id: &str) -> crate::Result<Option<JobRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {jid}, {sjid}, {uid}, {al}, {tr}, {mt}, {st}, {ca}, {ua} FROM jobs WHERE {jid} = ?",
            jid = col::JOB_ID,
            sjid = col::SCHEDULER_JOB_ID,
            uid = col::USER_ID,
            al = col::ALIGNMENT_ID,
            tr = col::TREE_ID,
            mt = col::METHOD_TYPE,
            st = col::STATUS,
            ca = col::CREATED_AT,
            ua = col::UPDATED_AT,
        ))?;
        let mut rows = stmt.query_map(params![job_id], Self::map_row)?;
        match rows.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<JobRecord> {
        Ok(JobRecord {
            job_id: row.get(0)?,
            scheduler_job_id: row.get(1)?,
            user_id: row.get(2)?,
            alignment_id: row.get(3)?,
            tree_id: row.get(4)?,
            method_type: row.get(5)?,
            status: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
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
    fn store_job_with_user_roundtrip() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        let store = JobStore::new(&conn);
        store.store_job_with_user("job-1", "42", Some("alice"), 100).unwrap();

        assert_eq!(store.get_scheduler_job_id("job-1").unwrap(), "42");
        assert_eq!(store.get_job_owner("job-1").unwrap(), "alice");
    }

    #[test]
    fn store_job_with_user_preserves_owner_on_empty_user() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        let store = JobStore::new(&conn);
        store.store_job_with_user("job-1", "42", Some("alice"), 100).unwrap();
        store.store_job_with_user("job-1", "43", Some(""), 200).unwrap();

        assert_eq!(store.get_job_owner("job-1").unwrap(), "alice");
        assert_eq!(store.get_scheduler_job_id("job-1").unwrap(), "43");
    }

    #[test]
    fn empty_job_id_rejected() {
        let conn = test_conn();
        let store = JobStore::new(&conn);
        assert!(matches!(
            store.store_job_mapping("", "42", 0),
            Err(crate::Error::CannotBeEmpty(_))
        ));
    }

    #[test]
    fn filter_whitelist_ignores_unknown_keys_and_is_injection_safe() {
        let conn = test_conn();
        conn.execute("INSERT INTO sessions (subject, created_at, last_seen) VALUES ('alice', 0, 0)", params![]).unwrap();
        let store = JobStore::new(&conn);
        store.store_job_with_user("job-1", "1", Some("alice"), 0).unwrap();
        store.store_job_metadata("job-1", None, None, "FEL", "running", 0).unwrap();
        store.store_job_with_user("job-2", "2", Some("alice"), 0).unwrap();
        store.store_job_metadata("job-2", None, None, "FEL", "pending", 0).unwrap();

        let mut filters = HashMap::new();
        filters.insert("user_id".to_string(), "alice".to_string());
        filters.insert("status".to_string(), "running".to_string());
        filters.insert("evil".to_string(), "x'; DROP TABLE jobs; --".to_string());

        let jobs = store.list_jobs_with_filters(&filters).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, "job-1");

        // table still queryable
        assert_eq!(store.list_jobs_by_user("alice").unwrap().len(), 2);
    }
}
