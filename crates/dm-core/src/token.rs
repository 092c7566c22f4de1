//! Token service: signed bearer tokens and the
//! subject-extraction / auto-session flow built on top of them.

use std::collections::HashMap;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::json;

use crate::config::TokenConfig;
use crate::error::{Error, Result};
use crate::session::SessionTracker;

/// An arbitrary claims map. `iat`/`exp` are injected by `generate_token`;
/// everything else is caller-supplied.
pub type Claims = HashMap<String, serde_json::Value>;

/// The two places a caller-presented token can come from: the `user_token`
/// query parameter, or the identically-named request header. The HTTP
/// boundary (out of scope here) is responsible for pulling these two
/// strings out of the actual request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSources<'a> {
    pub query_token: Option<&'a str>,
    pub header_token: Option<&'a str>,
}

/// The result of `GetOrCreateSubject`: the resolved subject, plus a new
/// token to surface as the `X-Session-Token` response header when a fresh
/// session had to be minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub subject: String,
    pub new_session_token: Option<String>,
}

/// Anything that can answer "who owns resource `id`" — `JobTracker`,
/// `DatasetTracker` and `ConversationTracker` all implement this so
/// `Check*Access` can share one code path.
pub trait OwnerLookup {
    fn get_owner(&self, id: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    fn signing_key(&self) -> Result<Vec<u8>> {
        let path = self
            .config
            .key_path
            .as_ref()
            .ok_or_else(|| Error::generic("key_path not set"))?;
        std::fs::read(path).map_err(Error::from)
    }

    /// Signs `claims` plus freshly computed `iat`/`exp`. Fails when
    /// `key_path` is unset or unreadable.
    pub fn generate_token(&self, mut claims: Claims) -> Result<String> {
        let key = self.signing_key()?;
        let now = chrono::Utc::now().timestamp();
        claims.insert("iat".to_string(), json!(now));
        claims.insert("exp".to_string(), json!(now + self.config.expiration_seconds));

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &EncodingKey::from_secret(&key))?;
        Ok(token)
    }

    /// Convenience for `{sub: subject, type: "user"}`.
    pub fn generate_user_token(&self, subject: &str) -> Result<String> {
        let mut claims = Claims::new();
        claims.insert("sub".to_string(), json!(subject));
        claims.insert("type".to_string(), json!("user"));
        self.generate_token(claims)
    }

    /// Verifies signature and expiry, returns the full claims map.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let key = self.signing_key()?;
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&key), &validation)
            .map_err(|_| Error::InvalidToken)?;
        Ok(data.claims)
    }

    /// Extracts the token from the query parameter (preferred) or header,
    /// trims surrounding whitespace, validates it, and returns `sub`.
    pub fn get_subject(&self, sources: TokenSources<'_>) -> Result<String> {
        let raw = sources.query_token.or(sources.header_token).ok_or(Error::NoTokenProvided)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::NoTokenProvided);
        }
        let claims = self.validate_token(trimmed)?;
        match claims.get("sub").and_then(|v| v.as_str()) {
            Some(sub) => Ok(sub.to_string()),
            None => Err(Error::MissingSubjectClaim),
        }
    }

    /// `GetSubject`, falling back to a freshly minted session when no valid
    /// token is present. Requires a session tracker; without one this fails
    /// `session tracker not available`.
    pub fn get_or_create_subject(
        &self,
        sources: TokenSources<'_>,
        sessions: Option<&SessionTracker>,
    ) -> Result<AuthOutcome> {
        if let Ok(subject) = self.get_subject(sources) {
            return Ok(AuthOutcome { subject, new_session_token: None });
        }

        let sessions = sessions.ok_or(Error::SessionTrackerNotAvailable)?;
        let subject = sessions.create_session()?;
        let token = self.generate_user_token(&subject)?;
        Ok(AuthOutcome { subject, new_session_token: Some(token) })
    }

    /// Shared implementation for `CheckJobAccess`/`CheckDatasetAccess`/
    /// `CheckConversationAccess`: resolve the caller's subject, then — if a
    /// tracker was supplied — verify it owns `resource_id`.
    fn check_access(
        &self,
        sources: TokenSources<'_>,
        sessions: Option<&SessionTracker>,
        resource_id: &str,
        tracker: Option<&dyn OwnerLookup>,
    ) -> Result<String> {
        let outcome = self.get_or_create_subject(sources, sessions)?;
        let Some(tracker) = tracker else {
            return Ok(outcome.subject);
        };
        let owner = tracker.get_owner(resource_id)?;
        if owner != outcome.subject {
            return Err(Error::NoAccess);
        }
        Ok(outcome.subject)
    }

    pub fn check_job_access(
        &self,
        sources: TokenSources<'_>,
        sessions: Option<&SessionTracker>,
        job_id: &str,
        tracker: Option<&dyn OwnerLookup>,
    ) -> Result<String> {
        self.check_access(sources, sessions, job_id, tracker)
    }

    pub fn check_dataset_access(
        &self,
        sources: TokenSources<'_>,
        sessions: Option<&SessionTracker>,
        dataset_id: &str,
        tracker: Option<&dyn OwnerLookup>,
    ) -> Result<String> {
        self.check_access(sources, sessions, dataset_id, tracker)
    }

    pub fn check_conversation_access(
        &self,
        sources: TokenSources<'_>,
        sessions: Option<&SessionTracker>,
        conversation_id: &str,
        tracker: Option<&dyn OwnerLookup>,
    ) -> Result<String> {
        self.check_access(sources, sessions, conversation_id, tracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn service_with_key() -> (TokenService, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"test-signing-key").unwrap();
        let config = TokenConfig {
            key_path: Some(file.path().to_path_buf()),
            expiration_seconds: 3600,
            refresh_interval_seconds: 3600,
            username: "datamonkey".to_string(),
        };
        (TokenService::new(config), file)
    }

    #[test]
    fn round_trip_preserves_claims() {
        let (service, _file) = service_with_key();
        let mut claims = Claims::new();
        claims.insert("sub".to_string(), json!("u"));
        claims.insert("role".to_string(), json!("admin"));
        claims.insert("premium".to_string(), json!(true));
        claims.insert("level".to_string(), json!(42));

        let token = service.generate_token(claims).unwrap();
        let decoded = service.validate_token(&token).unwrap();

        assert_eq!(decoded.get("sub").unwrap(), &json!("u"));
        assert_eq!(decoded.get("role").unwrap(), &json!("admin"));
        assert_eq!(decoded.get("premium").unwrap(), &json!(true));
        assert_eq!(decoded.get("level").unwrap(), &json!(42.0));
        assert!(decoded.contains_key("iat"));
        assert!(decoded.contains_key("exp"));
    }

    #[test]
    fn expired_token_fails_validation() {
        let (service, _file) = service_with_key();
        let mut claims = Claims::new();
        claims.insert("sub".to_string(), json!("u"));
        claims.insert("exp".to_string(), json!(0));
        claims.insert("iat".to_string(), json!(0));

        let key = service.signing_key().unwrap();
        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &EncodingKey::from_secret(&key)).unwrap();

        assert!(matches!(service.validate_token(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn get_subject_prefers_query_over_header() {
        let (service, _file) = service_with_key();
        let token = service.generate_user_token("alice").unwrap();
        let sources = TokenSources { query_token: Some(&token), header_token: Some("garbage") };
        assert_eq!(service.get_subject(sources).unwrap(), "alice");
    }

    #[test]
    fn get_subject_trims_whitespace() {
        let (service, _file) = service_with_key();
        let token = service.generate_user_token("alice").unwrap();
        let padded = format!("  {}  ", token);
        let sources = TokenSources { query_token: Some(&padded), header_token: None };
        assert_eq!(service.get_subject(sources).unwrap(), "alice");
    }

    #[test]
    fn get_subject_with_no_token_fails() {
        let (service, _file) = service_with_key();
        let sources = TokenSources::default();
        assert!(matches!(service.get_subject(sources), Err(Error::NoTokenProvided)));
    }
}
