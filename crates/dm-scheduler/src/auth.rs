//! Credential lifecycle for the cluster scheduler adapter.
//!
//! A static `auth_token` is used verbatim when configured. Otherwise a
//! background task refreshes a signed token every `token_refresh_interval`
//! by invoking the token service; the current token is kept behind an
//! `Arc<RwLock<String>>` so readers never block the refresher and vice
//! versa.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use dm_core::TokenService;

use crate::error::{Error, Result};

enum Inner {
    Static(String),
    Refreshed { current: Arc<RwLock<String>>, handle: tokio::task::JoinHandle<()> },
}

pub struct SchedulerAuth {
    inner: Inner,
}

impl SchedulerAuth {
    pub fn static_token(token: impl Into<String>) -> Self {
        Self { inner: Inner::Static(token.into()) }
    }

    /// Performs one refresh synchronously (so the adapter is never
    /// advertised as ready with a stale/missing token), then spawns the
    /// background loop.
    pub async fn refreshed(
        token_service: Arc<TokenService>,
        username: String,
        refresh_interval: Duration,
    ) -> Result<Self> {
        let initial = token_service.generate_user_token(&username)?;
        let current = Arc::new(RwLock::new(initial));

        let handle = {
            let current = current.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(refresh_interval).await;
                    match token_service.generate_user_token(&username) {
                        Ok(token) => {
                            if let Ok(mut guard) = current.write() {
                                *guard = token;
                            }
                            tracing::info!("refreshed scheduler auth token");
                        }
                        Err(err) => {
                            tracing::info!(error = %err, "scheduler token refresh failed, retaining previous token");
                        }
                    }
                }
            })
        };

        Ok(Self { inner: Inner::Refreshed { current, handle } })
    }

    pub fn current_token(&self) -> Option<String> {
        match &self.inner {
            Inner::Static(token) => Some(token.clone()),
            Inner::Refreshed { current, .. } => current.read().ok().map(|g| g.clone()),
        }
    }

    pub fn require_token(&self) -> Result<String> {
        self.current_token().filter(|t| !t.is_empty()).ok_or(Error::AuthTokenNotProvided)
    }

    /// Stops the refresh task deterministically. A no-op for a static token.
    pub fn shutdown(self) {
        if let Inner::Refreshed { handle, .. } = self.inner {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_is_used_verbatim() {
        let auth = SchedulerAuth::static_token("fixed-token");
        assert_eq!(auth.require_token().unwrap(), "fixed-token");
    }

    #[test]
    fn missing_token_fails() {
        let auth = SchedulerAuth { inner: Inner::Static(String::new()) };
        assert!(matches!(auth.require_token(), Err(Error::AuthTokenNotProvided)));
    }

    #[tokio::test]
    async fn refreshed_token_is_available_before_first_interval_elapses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"scheduler-signing-key").unwrap();
        let token_service = Arc::new(TokenService::new(dm_core::TokenConfig {
            key_path: Some(file.path().to_path_buf()),
            expiration_seconds: 3600,
            refresh_interval_seconds: 3600,
            username: "datamonkey".to_string(),
        }));

        let auth =
            SchedulerAuth::refreshed(token_service, "datamonkey".to_string(), Duration::from_secs(3600))
                .await
                .unwrap();
        assert!(auth.require_token().is_ok());
        auth.shutdown();
    }
}
