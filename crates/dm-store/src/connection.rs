//! Database connection management.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single embedded SQLite handle shared by every component.
///
/// All components receive this handle rather than a bare path so the
/// process runs one connection with consistent PRAGMA state (WAL mode,
/// foreign keys always on).
#[derive(Debug, Clone)]
pub struct Database {
    connection: Arc<std::sync::Mutex<Connection>>,
}

impl Database {
    /// Default database path, honoring `DATAMONKEY_HOME` or falling back to
    /// platform state directories.
    ///
    /// Priority order:
    /// 1. `DATAMONKEY_HOME` environment variable (custom).
    /// 2. Platform-specific defaults:
    ///    - Linux: `${XDG_STATE_HOME:-~/.local/state}/datamonkey/state.db`
    ///    - macOS: `~/Library/Application Support/datamonkey/state.db`
    ///    - Windows: `%LOCALAPPDATA%\datamonkey\state.db`
    pub fn default_path() -> crate::Result<PathBuf> {
        if let Ok(home) = std::env::var("DATAMONKEY_HOME") {
            return Ok(PathBuf::from(home).join("state.db"));
        }

        #[cfg(target_os = "linux")]
        {
            let xdg_state_home =
                std::env::var("XDG_STATE_HOME").map(PathBuf::from).unwrap_or_else(|_| {
                    let home = std::env::var("HOME").expect("HOME environment variable not set");
                    PathBuf::from(home).join(".local").join("state")
                });
            Ok(xdg_state_home.join("datamonkey").join("state.db"))
        }

        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            Ok(PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("datamonkey")
                .join("state.db"))
        }

        #[cfg(target_os = "windows")]
        {
            let local_appdata =
                std::env::var("LOCALAPPDATA").expect("LOCALAPPDATA environment variable not set");
            Ok(PathBuf::from(local_appdata).join("datamonkey").join("state.db"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            Ok(PathBuf::from(home).join(".datamonkey").join("state.db"))
        }
    }

    /// Open the database at the default path.
    pub fn open_default() -> crate::Result<Self> {
        let path = Self::default_path()?;
        Self::open(&path)
    }

    /// Open (creating if necessary) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            connection: Arc::new(std::sync::Mutex::new(conn)),
        })
    }

    /// Open an in-memory database, used by tests.
    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            connection: Arc::new(std::sync::Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> crate::Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        crate::migrations::MigrationManager::migrate(conn)?;
        Ok(())
    }

    /// Access the underlying connection. The caller must hold the lock for
    /// the duration of any query it issues.
    pub fn connection(&self) -> &std::sync::Mutex<Connection> {
        &self.connection
    }

    /// Run `f` inside a transaction, rolling back on error.
    pub fn transaction<F, T>(&self, f: F) -> crate::Result<T>
    where
        F: FnOnce(&Connection) -> crate::Result<T>,
    {
        let conn = self.connection.lock().map_err(|e| {
            crate::Error::generic(format!("failed to acquire database lock: {}", e))
        })?;

        let tx = conn.unchecked_transaction()?;
        match f(&tx) {
            Ok(result) => {
                tx.commit()?;
                Ok(result)
            }
            Err(e) => {
                tx.rollback()?;
                Err(e)
            }
        }
    }
}
