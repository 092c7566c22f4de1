//! Database migration management.

use rusqlite::{params, Connection};

/// Database migration manager.
pub struct MigrationManager;

impl MigrationManager {
    /// Apply all pending migrations to the database.
    pub fn migrate(conn: &Connection) -> crate::Result<()> {
        // Create schema migrations table first
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        // Get current version
        let current_version = Self::current_version(conn)?.unwrap_or(0);

        // Apply migrations sequentially
        if current_version < 1 {
            tracing::info!("applying migration 1");
            Self::apply_migration_1(conn)?;
        }

        Ok(())
    }

    /// Apply migration version 1 - the complete schema described in §3.
    fn apply_migration_1(conn: &Connection) -> crate::Result<()> {
        conn.execute_batch(
            r#"
            -- Anonymous sessions. Every other resource is owned by a subject,
            -- directly or transitively, and cascades from here on delete.
            CREATE TABLE IF NOT EXISTS sessions (
                subject TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                last_seen INTEGER NOT NULL
            );

            -- Content-addressed datasets. The id is derived from the content
            -- hash (and the owning subject, when one is supplied).
            CREATE TABLE IF NOT EXISTS datasets (
                id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES sessions(subject) ON DELETE CASCADE,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                content_hash TEXT NOT NULL,
                data_json TEXT,
                created TEXT NOT NULL,
                updated TEXT NOT NULL
            );

            -- Jobs encode both the scheduler mapping and analysis metadata
            -- so that listing/filtering is a single query.
            CREATE TABLE IF NOT EXISTS jobs (
                job_id TEXT PRIMARY KEY,
                scheduler_job_id TEXT NOT NULL DEFAULT '',
                user_id TEXT REFERENCES sessions(subject) ON DELETE CASCADE,
                alignment_id TEXT REFERENCES datasets(id) ON DELETE CASCADE,
                tree_id TEXT REFERENCES datasets(id) ON DELETE CASCADE,
                method_type TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'pending',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            -- Chat conversations, owned by a session.
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES sessions(subject) ON DELETE CASCADE,
                title TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                updated TEXT NOT NULL
            );

            -- Messages are append-only, ordered by autoincrementing id.
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            -- Generated visualization specifications.
            CREATE TABLE IF NOT EXISTS visualizations (
                viz_id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES sessions(subject) ON DELETE CASCADE,
                job_id TEXT REFERENCES jobs(job_id) ON DELETE CASCADE,
                dataset_id TEXT REFERENCES datasets(id) ON DELETE CASCADE,
                title TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                spec TEXT NOT NULL,
                metadata TEXT,
                created TEXT NOT NULL,
                updated TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_datasets_user ON datasets(user_id);
            CREATE INDEX IF NOT EXISTS idx_jobs_user ON jobs(user_id);
            CREATE INDEX IF NOT EXISTS idx_jobs_alignment ON jobs(alignment_id);
            CREATE INDEX IF NOT EXISTS idx_jobs_tree ON jobs(tree_id);
            CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
            CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations(user_id);
            CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id, id);
            CREATE INDEX IF NOT EXISTS idx_visualizations_user ON visualizations(user_id);
            CREATE INDEX IF NOT EXISTS idx_visualizations_job ON visualizations(job_id);
            CREATE INDEX IF NOT EXISTS idx_visualizations_dataset ON visualizations(dataset_id);

            INSERT OR REPLACE INTO schema_migrations (version) VALUES (1);
            "#,
        )?;

        Ok(())
    }

    /// Get the current schema version.
    pub fn current_version(conn: &Connection) -> crate::Result<Option<u32>> {
        let mut stmt = conn.prepare("SELECT MAX(version) FROM schema_migrations")?;

        let version: Option<u32> = stmt.query_row(params![], |row| row.get(0)).ok();

        Ok(version)
    }
}
