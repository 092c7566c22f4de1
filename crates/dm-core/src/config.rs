//! Process-wide configuration, loaded once from the environment.
//!
//! Every component that needs an environment- or file-derived setting (the
//! store's db path, the token service's key path/expiration, the scheduler
//! adapter's base URL, the method catalog's `data_dir`/`base_path`) reads
//! from one `AppConfig` built at process start, following the same
//! env-var precedence `Database::default_path` uses.

use std::path::PathBuf;

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Path to the HMAC signing key. `GenerateToken` fails if unset/unreadable.
    pub key_path: Option<PathBuf>,
    pub expiration_seconds: i64,
    pub refresh_interval_seconds: i64,
    pub username: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            key_path: std::env::var("DATAMONKEY_TOKEN_KEY_PATH").ok().map(PathBuf::from),
            expiration_seconds: env_i64("DATAMONKEY_TOKEN_EXPIRATION_SECONDS", 86_400),
            refresh_interval_seconds: env_i64("DATAMONKEY_TOKEN_REFRESH_INTERVAL_SECONDS", 12 * 3600),
            username: std::env::var("DATAMONKEY_SCHEDULER_USERNAME")
                .unwrap_or_else(|_| "datamonkey".to_string()),
        }
    }
}

/// Dataset tracker configuration.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub dataset_dir: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset_dir: std::env::var("DATAMONKEY_DATASET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_state_dir().join("datasets")),
        }
    }
}

/// Session tracker configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_age_seconds: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_age_seconds: env_i64("DATAMONKEY_SESSION_MAX_AGE_SECONDS", 30 * 24 * 3600) }
    }
}

/// Top-level configuration assembled once at process start.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub token: TokenConfig,
    pub dataset: DatasetConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::default()
    }
}

fn default_state_dir() -> PathBuf {
    if let Ok(home) = std::env::var("DATAMONKEY_HOME") {
        return PathBuf::from(home);
    }
    #[cfg(target_os = "linux")]
    {
        let xdg_state_home = std::env::var("XDG_STATE_HOME").map(PathBuf::from).unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("state")
        });
        return xdg_state_home.join("datamonkey");
    }
    #[cfg(not(target_os = "linux"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".datamonkey")
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
